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

use arbor_db::repositories::{ProductRepository, UserRepository};
use axum::{extract::State, Json};
use serde::Serialize;

use crate::{error::AppError, AppState};

#[derive(Debug, Serialize)]
pub struct ListCount {
    pub key: String,
    pub path: String,
    pub count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AdminMeta {
    pub auth_list: String,
    pub lists: Vec<ListCount>,
}

/// GET /admin/meta
///
/// Only reachable through the admin access gate.
pub async fn admin_meta(State(state): State<AppState>) -> Result<Json<AdminMeta>, AppError> {
    let users = UserRepository::new(state.db.clone()).count().await?;
    let products = ProductRepository::new(state.db.clone()).count().await?;

    let lists = state
        .lists
        .keys()
        .filter_map(|key| state.lists.get(key))
        .map(|list| ListCount {
            key: list.key.clone(),
            path: list.path.clone(),
            count: match list.key.as_str() {
                "User" => Some(users),
                "Product" => Some(products),
                _ => None,
            },
        })
        .collect();

    Ok(Json(AdminMeta {
        auth_list: state.auth.list_key.clone(),
        lists,
    }))
}
