use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// Initialize the database, creating the file if needed and running migrations
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    // Create the parent directory of file-backed databases
    if database_url.starts_with("sqlite:") {
        let path = database_url
            .trim_start_matches("sqlite:")
            .trim_start_matches("//");
        if !path.starts_with(":memory:") {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create database directory")?;
                }
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL: {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .context("Invalid in-memory database URL")?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("Failed to open in-memory database")?;

    run_migrations(&pool).await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Checking for pending migrations...");

    sqlx::migrate!("../migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!("All migrations processed successfully");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn table_names(pool: &SqlitePool) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name != 'sqlite_sequence' ORDER BY name",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    #[tokio::test]
    async fn test_memory_database_has_schema() -> Result<()> {
        let pool = init_memory_database().await?;
        let tables = table_names(&pool).await?;
        assert_eq!(tables, vec!["product_images", "products", "users"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_init_database_creates_file_and_directory() -> Result<()> {
        let dir = TempDir::new()?;
        let db_path = dir.path().join("nested").join("arbor.db");
        let url = format!("sqlite:{}", db_path.display());

        let pool = init_database(&url).await?;
        assert!(db_path.exists());
        assert_eq!(table_names(&pool).await?.len(), 3);
        pool.close().await;

        // Re-opening runs migrations again without failing
        let pool = init_database(&url).await?;
        assert_eq!(table_names(&pool).await?.len(), 3);
        Ok(())
    }
}
