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

use crate::{session::session_cookie, AppState, Config};
use arbor_core::models::{role::Role, user::User};
use arbor_db::{init_memory_database, repositories::UserRepository};
use axum_extra::extract::cookie::Cookie;
use sqlx::SqlitePool;

pub const TEST_FRONTEND_URL: &str = "http://localhost:7777";

pub async fn test_db() -> Result<SqlitePool, anyhow::Error> {
    init_memory_database().await
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "COOKIE_SECRET" => Some("test-cookie-secret-0123456789abcdef".to_string()),
        "FRONTEND_URL" => Some(TEST_FRONTEND_URL.to_string()),
        _ => None,
    })
    .expect("Test config should load")
}

pub async fn create_test_state() -> Result<AppState, anyhow::Error> {
    Ok(AppState::new(test_db().await?, test_config()))
}

pub async fn create_test_user(
    db: &SqlitePool,
    email: &str,
    password: &str,
    role: Role,
) -> Result<i64, anyhow::Error> {
    let user = User::with_role("Test User".to_string(), email.to_string(), password, role)?;
    UserRepository::new(db.clone()).create(&user).await
}

/// A valid session cookie for `user_id`, as login would issue it
pub fn session_cookie_for(state: &AppState, user_id: i64) -> Cookie<'static> {
    let token = state
        .sessions
        .issue(&state.auth.list_key, user_id)
        .expect("Failed to issue session token");
    session_cookie(token, state.sessions.max_age(), false)
}
