// Arbor - A headless content backend built with Rust
// Copyright (C) 2025 Arbor Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! End-to-end configuration loading from the process environment

use anyhow::Result;
use arbor_core::models::session::DEFAULT_SESSION_MAX_AGE_SECONDS;
use arbor_web::config::{Config, DEFAULT_DATABASE_URL};
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "DATABASE_URL",
    "COOKIE_SECRET",
    "FRONTEND_URL",
    "HOST",
    "PORT",
    "SECURE_COOKIES",
    "SESSION_MAX_AGE_SECONDS",
];

/// Test helper to save and restore environment state
struct EnvGuard {
    saved_vars: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn new(vars: &[&str]) -> Self {
        let saved_vars = vars
            .iter()
            .map(|var| (var.to_string(), env::var(var).ok()))
            .collect();

        for var in vars {
            env::remove_var(var);
        }

        Self { saved_vars }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (var, value) in &self.saved_vars {
            match value {
                Some(val) => env::set_var(var, val),
                None => env::remove_var(var),
            }
        }
    }
}

#[test]
#[serial]
fn test_defaults_when_environment_is_empty() -> Result<()> {
    let _guard = EnvGuard::new(VARS);

    let config = Config::from_env()?;

    assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    assert_eq!(config.database_url, "sqlite:arbor.db");
    assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    assert!(!config.secure_cookies);
    assert_eq!(config.session_max_age_seconds, DEFAULT_SESSION_MAX_AGE_SECONDS);
    assert!(config.allowed_origins().is_empty());
    // A development secret is generated
    assert_eq!(config.cookie_secret.len(), 64);

    Ok(())
}

#[test]
#[serial]
fn test_environment_overrides_defaults() -> Result<()> {
    let _guard = EnvGuard::new(VARS);
    env::set_var("DATABASE_URL", "sqlite:/var/lib/arbor/shop.db");
    env::set_var("COOKIE_SECRET", "a-very-secret-value");
    env::set_var("FRONTEND_URL", "https://shop.example.com");
    env::set_var("HOST", "127.0.0.1");
    env::set_var("PORT", "8080");
    env::set_var("SECURE_COOKIES", "true");
    env::set_var("SESSION_MAX_AGE_SECONDS", "3600");

    let config = Config::from_env()?;

    assert_eq!(config.database_url, "sqlite:/var/lib/arbor/shop.db");
    assert_eq!(config.cookie_secret, "a-very-secret-value");
    assert_eq!(config.allowed_origins(), vec!["https://shop.example.com"]);
    assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    assert!(config.secure_cookies);
    assert_eq!(config.session_config().max_age, chrono::Duration::hours(1));

    Ok(())
}

#[test]
#[serial]
fn test_generated_secrets_differ_between_loads() -> Result<()> {
    let _guard = EnvGuard::new(VARS);

    let first = Config::from_env()?;
    let second = Config::from_env()?;
    assert_ne!(first.cookie_secret, second.cookie_secret);

    Ok(())
}

#[test]
#[serial]
fn test_invalid_numbers_are_rejected() {
    let _guard = EnvGuard::new(VARS);

    env::set_var("PORT", "not-a-port");
    assert!(Config::from_env().is_err());

    env::remove_var("PORT");
    for value in ["forever", "0", "-5", "9000000000000", "9223372036854775807"] {
        env::set_var("SESSION_MAX_AGE_SECONDS", value);
        assert!(Config::from_env().is_err(), "{} should be rejected", value);
    }

    env::remove_var("SESSION_MAX_AGE_SECONDS");
    env::set_var("SECURE_COOKIES", "maybe");
    assert!(Config::from_env().is_err());
}

#[test]
#[serial]
fn test_empty_values_count_as_unset() -> Result<()> {
    let _guard = EnvGuard::new(VARS);
    env::set_var("DATABASE_URL", "");
    env::set_var("FRONTEND_URL", "  ");

    let config = Config::from_env()?;
    assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    assert!(config.frontend_url.is_none());

    Ok(())
}
