use anyhow::{Context, Result};
use arbor_core::models::{role::Role, user::User};
use sqlx::SqlitePool;

use super::parse_datetime;

type UserRow = (i64, String, String, String, String, String, String);

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &User) -> Result<i64> {
        if let Err(e) = user.is_valid() {
            return Err(anyhow::anyhow!("Invalid user: {}", e));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(result.last_insert_rowid())
    }

    /// Insert only while the table is empty. Returns `None` when another user
    /// already exists, so concurrent bootstraps cannot both succeed.
    pub async fn create_first(&self, user: &User) -> Result<Option<i64>> {
        if let Err(e) = user.is_valid() {
            return Err(anyhow::anyhow!("Invalid user: {}", e));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at, updated_at)
            SELECT ?, ?, ?, ?, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM users)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create first user")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(result.last_insert_rowid()))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find user by id")?;

        row.map(user_from_row).transpose()
    }

    /// Lookup by the identity field
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find user by email")?;

        row.map(user_from_row).transpose()
    }

    /// Cheaper than `find_by_id` when only existence matters
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check user existence")?;

        Ok(found.is_some())
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;

        Ok(count)
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        rows.into_iter().map(user_from_row).collect()
    }

    pub async fn update(&self, user: &User) -> Result<()> {
        let id = user
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update user without id"))?;

        if let Err(e) = user.is_valid() {
            return Err(anyhow::anyhow!("Invalid user: {}", e));
        }

        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, password_hash = ?, role = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("User not found"));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("User not found"));
        }

        Ok(())
    }
}

fn user_from_row(row: UserRow) -> Result<User> {
    let (id, name, email, password_hash, role, created_at, updated_at) = row;

    let role = role
        .parse::<Role>()
        .map_err(|e| anyhow::anyhow!("Corrupt role for user {}: {}", id, e))?;

    Ok(User {
        id: Some(id),
        name,
        email,
        password_hash,
        role,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}
