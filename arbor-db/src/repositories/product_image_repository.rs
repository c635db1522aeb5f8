use anyhow::{Context, Result};
use arbor_core::models::product_image::ProductImage;
use sqlx::SqlitePool;

use super::parse_datetime;

type ProductImageRow = (i64, Option<i64>, String, String, String);

pub struct ProductImageRepository {
    pool: SqlitePool,
}

impl ProductImageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, image: &ProductImage) -> Result<i64> {
        if let Err(e) = image.is_valid() {
            return Err(anyhow::anyhow!("Invalid product image: {}", e));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO product_images (product_id, image_url, alt_text, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(image.product_id)
        .bind(&image.image_url)
        .bind(&image.alt_text)
        .bind(image.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create product image")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ProductImage>> {
        let row = sqlx::query_as::<_, ProductImageRow>(
            "SELECT id, product_id, image_url, alt_text, created_at FROM product_images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find product image by id")?;

        row.map(image_from_row).transpose()
    }

    pub async fn list_by_product(&self, product_id: i64) -> Result<Vec<ProductImage>> {
        let rows = sqlx::query_as::<_, ProductImageRow>(
            r#"
            SELECT id, product_id, image_url, alt_text, created_at
            FROM product_images
            WHERE product_id = ?
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list product images")?;

        rows.into_iter().map(image_from_row).collect()
    }

    /// Link an existing image to its owning product
    pub async fn attach_to_product(&self, image_id: i64, product_id: i64) -> Result<()> {
        let rows_affected = sqlx::query("UPDATE product_images SET product_id = ? WHERE id = ?")
            .bind(product_id)
            .bind(image_id)
            .execute(&self.pool)
            .await
            .context("Failed to attach product image")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Product image not found"));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM product_images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete product image")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Product image not found"));
        }

        Ok(())
    }
}

fn image_from_row(row: ProductImageRow) -> Result<ProductImage> {
    let (id, product_id, image_url, alt_text, created_at) = row;

    Ok(ProductImage {
        id: Some(id),
        product_id,
        image_url,
        alt_text,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}
