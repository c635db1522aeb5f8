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

use arbor_core::models::list::ListDefinition;
use axum::{extract::State, Json};

use crate::AppState;

/// GET /api/lists
pub async fn list_registry(State(state): State<AppState>) -> Json<Vec<ListDefinition>> {
    let lists = state
        .lists
        .keys()
        .filter_map(|key| state.lists.get(key).cloned())
        .collect();

    Json(lists)
}
