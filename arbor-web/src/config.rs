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

use anyhow::{Context, Result};
use arbor_core::models::session::{SessionConfig, DEFAULT_SESSION_MAX_AGE_SECONDS};
use chrono::Duration;
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:arbor.db";

/// Upper bound for `SESSION_MAX_AGE_SECONDS`: 100 years
pub const MAX_SESSION_MAX_AGE_SECONDS: i64 = 60 * 60 * 24 * 365 * 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cookie_secret: String,
    pub frontend_url: Option<String>,
    pub secure_cookies: bool,
    pub session_max_age_seconds: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let cookie_secret = var("COOKIE_SECRET").unwrap_or_else(|| {
            tracing::warn!(
                "COOKIE_SECRET is not set, generating a random secret; sessions will not survive a restart"
            );
            format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
        });

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("Invalid PORT")?,
            cookie_secret,
            frontend_url: var("FRONTEND_URL"),
            secure_cookies: match var("SECURE_COOKIES") {
                Some(value) => parse_flag(&value).context("Invalid SECURE_COOKIES")?,
                None => false,
            },
            session_max_age_seconds: match var("SESSION_MAX_AGE_SECONDS") {
                Some(value) => parse_max_age(&value).context("Invalid SESSION_MAX_AGE_SECONDS")?,
                None => DEFAULT_SESSION_MAX_AGE_SECONDS,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The frontend is the only origin granted credentialed CORS access
    pub fn allowed_origins(&self) -> Vec<String> {
        self.frontend_url.iter().cloned().collect()
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(
            self.cookie_secret.clone(),
            Duration::seconds(self.session_max_age_seconds),
        )
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected true or false, got '{}'", other),
    }
}

fn parse_max_age(value: &str) -> Result<i64> {
    let seconds: i64 = value.trim().parse()?;

    if seconds <= 0 {
        anyhow::bail!("must be positive, got {}", seconds);
    }
    if seconds > MAX_SESSION_MAX_AGE_SECONDS {
        anyhow::bail!(
            "must not exceed {} seconds, got {}",
            MAX_SESSION_MAX_AGE_SECONDS,
            seconds
        );
    }

    Ok(seconds)
}
