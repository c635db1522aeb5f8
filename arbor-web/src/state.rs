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

use arbor_core::models::{auth::AuthConfig, list::ListRegistry};
use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::session::SessionSigner;

/// Everything a request handler can reach. Built once in `main` from an
/// explicit [`Config`] and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub auth: Arc<AuthConfig>,
    pub lists: Arc<ListRegistry>,
    pub sessions: SessionSigner,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self::with_auth(db, config, AuthConfig::default())
    }

    pub fn with_auth(db: SqlitePool, config: Config, auth: AuthConfig) -> Self {
        let sessions = SessionSigner::new(&config.session_config());

        Self {
            db,
            config,
            auth: Arc::new(auth),
            lists: Arc::new(ListRegistry::storefront()),
            sessions,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
