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

//! Store connection and the optional seed step that runs right after it.

use anyhow::{Context, Result};
use arbor_db::{init_database, SeedData};
use sqlx::SqlitePool;

use crate::config::Config;

/// Command-line flag that triggers seeding on connect
pub const SEED_DATA_FLAG: &str = "--seed-data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Connected, nothing else to do
    Ready,
    /// Seed data was inserted; the process should exit
    Seeded(usize),
}

pub fn seed_requested<I, A>(args: I) -> bool
where
    I: IntoIterator<Item = A>,
    A: AsRef<str>,
{
    args.into_iter().any(|arg| arg.as_ref() == SEED_DATA_FLAG)
}

/// Runs once the store is reachable. Seeds exactly when the flag is present
/// and propagates any seeding failure.
pub async fn on_connect<A: AsRef<str>>(
    pool: &SqlitePool,
    args: &[A],
    seeder: &dyn SeedData,
) -> Result<ConnectOutcome> {
    tracing::info!("Connected to database");

    if !seed_requested(args) {
        return Ok(ConnectOutcome::Ready);
    }

    tracing::info!("{} flag present, inserting seed data", SEED_DATA_FLAG);
    let inserted = seeder
        .insert_seed_data(pool)
        .await
        .context("Failed to insert seed data")?;

    Ok(ConnectOutcome::Seeded(inserted))
}

pub async fn connect<A: AsRef<str>>(
    config: &Config,
    args: &[A],
    seeder: &dyn SeedData,
) -> Result<(SqlitePool, ConnectOutcome)> {
    tracing::debug!("Connecting to database: {}", config.database_url);
    let pool = init_database(&config.database_url).await?;

    let outcome = on_connect(&pool, args, seeder).await?;
    Ok((pool, outcome))
}
