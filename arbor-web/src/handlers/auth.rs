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

use arbor_core::models::{
    auth::{AuthConfig, AuthError},
    session::SessionState,
    user::User,
};
use arbor_db::repositories::UserRepository;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::{
    auth::CurrentSession,
    error::AppError,
    session::{removal_cookie, session_cookie},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub state: SessionState,
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct InitStatus {
    pub needs_init: bool,
    pub fields: Vec<String>,
}

/// Look up the identity and check the secret. Unknown identity and wrong
/// secret fail identically.
pub async fn authenticate(db: &SqlitePool, identity: &str, secret: &str) -> Result<User, AppError> {
    let user = UserRepository::new(db.clone())
        .find_by_email(identity)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !user.verify_password(secret)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(user)
}

/// Create the very first user. Fails once any user exists.
pub async fn init_first_item(
    db: &SqlitePool,
    auth: &AuthConfig,
    input: &HashMap<String, String>,
) -> Result<User, AppError> {
    let user_repo = UserRepository::new(db.clone());
    if user_repo.count().await? > 0 {
        return Err(AuthError::AlreadyInitialized.into());
    }

    let role = auth.validate_first_item(input)?;

    let field = |name: &str| input.get(name).cloned().unwrap_or_default();
    let password = field(&auth.secret_field);
    let mut user = User::with_role(field("name"), field(&auth.identity_field), &password, role)
        .map_err(|e| AuthError::Invalid(e.to_string()))?;

    // Atomic; a concurrent bootstrap can still win between count and insert
    let id = user_repo
        .create_first(&user)
        .await?
        .ok_or(AuthError::AlreadyInitialized)?;
    user.id = Some(id);

    tracing::info!(user_id = id, role = %role, "Initial user created");
    Ok(user)
}

fn start_session(state: &AppState, jar: CookieJar, user: &User) -> Result<(CookieJar, i64), AppError> {
    let id = user
        .id
        .ok_or_else(|| AppError::internal_server_error("User has no id"))?;
    let token = state.sessions.issue(&state.auth.list_key, id)?;
    let cookie = session_cookie(token, state.sessions.max_age(), state.config.secure_cookies);

    Ok((jar.add(cookie), id))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let (identity, secret) = state.auth.credentials(&input)?;

    let user = match authenticate(&state.db, identity, secret).await {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(identity = %identity, "Failed login attempt");
            return Err(e);
        }
    };

    let (jar, user_id) = start_session(&state, jar, &user)?;
    tracing::info!(user_id, "User logged in");

    Ok((jar, Json(SessionState::authenticated(user_id))))
}

/// POST /api/auth/logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(removal_cookie()), Json(SessionState::anonymous()))
}

/// GET /api/auth/session
pub async fn current_session(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<Json<SessionResponse>, AppError> {
    let user = match current.state.user_id {
        Some(id) => UserRepository::new(state.db.clone()).find_by_id(id).await?,
        None => None,
    };

    Ok(Json(SessionResponse {
        state: current.state,
        user,
    }))
}

/// GET /api/auth/init
pub async fn init_status(State(state): State<AppState>) -> Result<Json<InitStatus>, AppError> {
    let Some(init) = state.auth.init_first_item.as_ref() else {
        return Ok(Json(InitStatus {
            needs_init: false,
            fields: Vec::new(),
        }));
    };

    let count = UserRepository::new(state.db.clone()).count().await?;

    Ok(Json(InitStatus {
        needs_init: count == 0,
        fields: init.fields.clone(),
    }))
}

/// POST /api/auth/init
pub async fn init(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let user = init_first_item(&state.db, &state.auth, &input).await?;
    let (jar, user_id) = start_session(&state, jar, &user)?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse {
            state: SessionState::authenticated(user_id),
            user: Some(user),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_user, test_db};
    use arbor_core::models::role::Role;

    fn input(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_authenticate_success() -> anyhow::Result<()> {
        let db = test_db().await?;
        create_test_user(&db, "ada@example.com", "secret-pw", Role::Viewer).await?;

        let user = authenticate(&db, "ada@example.com", "secret-pw").await?;
        assert_eq!(user.email, "ada@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() -> anyhow::Result<()> {
        let db = test_db().await?;
        create_test_user(&db, "ada@example.com", "secret-pw", Role::Viewer).await?;

        let wrong_password = authenticate(&db, "ada@example.com", "nope").await.unwrap_err();
        let unknown_email = authenticate(&db, "bob@example.com", "secret-pw").await.unwrap_err();

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.status, unknown_email.status);
        assert_eq!(wrong_password.message, unknown_email.message);
        Ok(())
    }

    #[tokio::test]
    async fn test_init_first_item_grants_admin_once() -> anyhow::Result<()> {
        let db = test_db().await?;
        let auth = AuthConfig::default();
        let form = input(&[
            ("name", "Wes"),
            ("email", "wes@example.com"),
            ("password", "wespw"),
        ]);

        let user = init_first_item(&db, &auth, &form).await?;
        assert_eq!(user.role, Role::Admin);
        assert!(user.id.is_some());

        let again = input(&[
            ("name", "Eve"),
            ("email", "eve@example.com"),
            ("password", "evepw"),
        ]);
        let err = init_first_item(&db, &auth, &again).await.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(UserRepository::new(db).count().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_init_first_item_requires_all_fields() -> anyhow::Result<()> {
        let db = test_db().await?;
        let form = input(&[("name", "Wes"), ("email", "wes@example.com")]);

        let err = init_first_item(&db, &AuthConfig::default(), &form)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(UserRepository::new(db).count().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_init_first_item_rejects_bad_email() -> anyhow::Result<()> {
        let db = test_db().await?;
        let form = input(&[("name", "Wes"), ("email", "not-an-email"), ("password", "pw")]);

        let err = init_first_item(&db, &AuthConfig::default(), &form)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        Ok(())
    }
}
