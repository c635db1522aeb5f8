use anyhow::{Context, Result};
use arbor_core::models::product::{Product, ProductStatus};
use sqlx::SqlitePool;

use super::parse_datetime;

type ProductRow = (i64, String, String, String, i64, String, String);

const PRODUCT_COLUMNS: &str = "id, name, description, status, price, created_at, updated_at";

pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, product: &Product) -> Result<i64> {
        if let Err(e) = product.is_valid() {
            return Err(anyhow::anyhow!("Invalid product: {}", e));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, description, status, price, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.status.as_str())
        .bind(product.price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create product")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find product by id")?;

        row.map(product_from_row).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY id",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list products")?;

        rows.into_iter().map(product_from_row).collect()
    }

    pub async fn list_by_status(&self, status: ProductStatus) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE status = ? ORDER BY id",
            PRODUCT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list products by status")?;

        rows.into_iter().map(product_from_row).collect()
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count products")?;

        Ok(count)
    }

    pub async fn update(&self, product: &Product) -> Result<()> {
        let id = product
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update product without id"))?;

        if let Err(e) = product.is_valid() {
            return Err(anyhow::anyhow!("Invalid product: {}", e));
        }

        let rows_affected = sqlx::query(
            r#"
            UPDATE products
            SET name = ?, description = ?, status = ?, price = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.status.as_str())
        .bind(product.price)
        .bind(product.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update product")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Product not found"));
        }

        Ok(())
    }

    /// Images referencing the product go with it (ON DELETE CASCADE)
    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete product")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Product not found"));
        }

        Ok(())
    }
}

fn product_from_row(row: ProductRow) -> Result<Product> {
    let (id, name, description, status, price, created_at, updated_at) = row;

    let status = status
        .parse::<ProductStatus>()
        .map_err(|e| anyhow::anyhow!("Corrupt status for product {}: {}", id, e))?;

    Ok(Product {
        id: Some(id),
        name,
        description,
        status,
        price,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_memory_database;

    fn product(name: &str, status: ProductStatus) -> Product {
        Product::new(name.to_string(), format!("{} description", name), status, 1000)
    }

    #[tokio::test]
    async fn test_create_and_find() -> Result<()> {
        let pool = init_memory_database().await?;
        let repo = ProductRepository::new(pool);

        let id = repo.create(&product("Maple", ProductStatus::Available)).await?;
        let found = repo.find_by_id(id).await?.expect("product should exist");

        assert_eq!(found.name, "Maple");
        assert_eq!(found.status, ProductStatus::Available);
        assert_eq!(found.price, 1000);
        assert!(repo.find_by_id(id + 1).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_invalid_fails() -> Result<()> {
        let pool = init_memory_database().await?;
        let repo = ProductRepository::new(pool);

        let mut bad = product("Pine", ProductStatus::Draft);
        bad.price = -5;
        assert!(repo.create(&bad).await.is_err());
        assert_eq!(repo.count().await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_by_status() -> Result<()> {
        let pool = init_memory_database().await?;
        let repo = ProductRepository::new(pool);

        repo.create(&product("Birch", ProductStatus::Available)).await?;
        repo.create(&product("Cedar", ProductStatus::Draft)).await?;
        repo.create(&product("Elm", ProductStatus::Available)).await?;

        assert_eq!(repo.list().await?.len(), 3);
        let names: Vec<String> = repo
            .list_by_status(ProductStatus::Available)
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Birch", "Elm"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_update() -> Result<()> {
        let pool = init_memory_database().await?;
        let repo = ProductRepository::new(pool);
        let id = repo.create(&product("Fir", ProductStatus::Draft)).await?;

        let mut found = repo.find_by_id(id).await?.unwrap();
        found.status = ProductStatus::Unavailable;
        found.price = 2500;
        repo.update(&found).await?;

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.status, ProductStatus::Unavailable);
        assert_eq!(found.price, 2500);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_fails() -> Result<()> {
        let pool = init_memory_database().await?;
        let repo = ProductRepository::new(pool);
        assert!(repo.delete(42).await.is_err());
        Ok(())
    }
}
