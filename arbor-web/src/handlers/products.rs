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
    product::{Product, ProductStatus},
    product_image::ProductImage,
};
use arbor_db::repositories::{ProductImageRepository, ProductRepository};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{auth::RequireEditor, error::AppError, AppState};

#[derive(Debug, Serialize)]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: Product,
    pub photos: Vec<ProductImage>,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub price: i64,
}

#[derive(Debug, Deserialize)]
pub struct NewProductImage {
    pub image_url: String,
    #[serde(default)]
    pub alt_text: String,
}

async fn with_images(db: &SqlitePool, product: Product) -> Result<ProductWithImages, AppError> {
    let photos = match product.id {
        Some(id) => ProductImageRepository::new(db.clone()).list_by_product(id).await?,
        None => Vec::new(),
    };

    Ok(ProductWithImages { product, photos })
}

async fn find_product(db: &SqlitePool, id: i64) -> Result<Product, AppError> {
    ProductRepository::new(db.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductWithImages>>, AppError> {
    let repo = ProductRepository::new(state.db.clone());

    let products = match query.status.as_deref() {
        Some(status) => {
            let status = status
                .parse::<ProductStatus>()
                .map_err(AppError::bad_request)?;
            repo.list_by_status(status).await?
        }
        None => repo.list().await?,
    };

    let mut result = Vec::with_capacity(products.len());
    for product in products {
        result.push(with_images(&state.db, product).await?);
    }

    Ok(Json(result))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductWithImages>, AppError> {
    let product = find_product(&state.db, id).await?;
    Ok(Json(with_images(&state.db, product).await?))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductWithImages>), AppError> {
    let mut product = Product::new(
        input.name.trim().to_string(),
        input.description,
        input.status,
        input.price,
    );
    product.is_valid().map_err(AppError::bad_request)?;

    let id = ProductRepository::new(state.db.clone())
        .create(&product)
        .await?;
    product.id = Some(id);

    tracing::info!(product_id = id, user_id = ?user.id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(ProductWithImages {
            product,
            photos: Vec::new(),
        }),
    ))
}

/// DELETE /api/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    find_product(&state.db, id).await?;

    ProductRepository::new(state.db.clone()).delete(id).await?;
    tracing::info!(product_id = id, user_id = ?user.id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/products/{id}/images
pub async fn add_product_image(
    State(state): State<AppState>,
    RequireEditor(_user): RequireEditor,
    Path(id): Path<i64>,
    Json(input): Json<NewProductImage>,
) -> Result<(StatusCode, Json<ProductImage>), AppError> {
    find_product(&state.db, id).await?;

    let mut image = ProductImage::for_product(id, input.image_url.trim().to_string(), input.alt_text);
    image.is_valid().map_err(AppError::bad_request)?;

    let image_id = ProductImageRepository::new(state.db.clone())
        .create(&image)
        .await?;
    image.id = Some(image_id);

    Ok((StatusCode::CREATED, Json(image)))
}
