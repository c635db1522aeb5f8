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

//! User management. Admin only.

use arbor_core::models::{role::Role, user::User};
use arbor_db::repositories::{is_unique_violation, UserRepository};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{auth::RequireAdmin, error::AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to the least privileged role
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>, AppError> {
    let users = UserRepository::new(state.db.clone()).list().await?;
    Ok(Json(users))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let mut user = User::with_role(input.name, input.email, &input.password, input.role)
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let id = UserRepository::new(state.db.clone())
        .create(&user)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("A user with this email already exists")
            } else {
                AppError::from(e)
            }
        })?;
    user.id = Some(id);

    tracing::info!(user_id = id, role = %user.role, created_by = ?admin.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/{id}/role
pub async fn update_user_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(input): Json<RoleUpdate>,
) -> Result<Json<User>, AppError> {
    if admin.id == Some(id) && input.role != Role::Admin {
        return Err(AppError::bad_request("Admins cannot demote themselves"));
    }

    let repo = UserRepository::new(state.db.clone());
    let mut user = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))?;

    user.role = input.role;
    user.updated_at = chrono::Utc::now();
    repo.update(&user).await?;

    tracing::info!(user_id = id, role = %user.role, "User role changed");
    Ok(Json(user))
}
