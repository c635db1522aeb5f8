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

//! Predefined products used to bootstrap a fresh database.
//!
//! Seeding is not idempotent: every run inserts the full set again.

use anyhow::{Context, Result};
use arbor_core::models::{
    product::{Product, ProductStatus},
    product_image::ProductImage,
};
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::repositories::{ProductImageRepository, ProductRepository};

pub struct SeedProduct {
    pub name: &'static str,
    pub description: &'static str,
    pub status: ProductStatus,
    pub price: i64,
    pub image_url: &'static str,
}

pub const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Japanese Maple",
        description: "Deep red foliage that turns crimson in autumn. Ships in a 5 gallon pot.",
        status: ProductStatus::Available,
        price: 8900,
        image_url: "/seed/japanese-maple.jpg",
    },
    SeedProduct {
        name: "Juniper Bonsai",
        description: "A ten year old juniper, wired and shaped. Comes with a glazed tray.",
        status: ProductStatus::Available,
        price: 14500,
        image_url: "/seed/juniper-bonsai.jpg",
    },
    SeedProduct {
        name: "Meyer Lemon",
        description: "Dwarf citrus that fruits indoors. Fragrant blossoms twice a year.",
        status: ProductStatus::Available,
        price: 5400,
        image_url: "/seed/meyer-lemon.jpg",
    },
    SeedProduct {
        name: "Weeping Willow",
        description: "Fast growing and happiest near water. Bare root sapling.",
        status: ProductStatus::Available,
        price: 3200,
        image_url: "/seed/weeping-willow.jpg",
    },
    SeedProduct {
        name: "Giant Sequoia",
        description: "Start your own forest giant. Two year old seedling.",
        status: ProductStatus::Unavailable,
        price: 2700,
        image_url: "/seed/giant-sequoia.jpg",
    },
    SeedProduct {
        name: "Olive Tree",
        description: "Silver leaves, gnarled trunk, drought tolerant once established.",
        status: ProductStatus::Draft,
        price: 11900,
        image_url: "/seed/olive-tree.jpg",
    },
];

/// Something that can populate a freshly connected store
#[async_trait]
pub trait SeedData: Send + Sync {
    /// Returns how many top-level records were inserted
    async fn insert_seed_data(&self, pool: &SqlitePool) -> Result<usize>;
}

/// Inserts [`SEED_PRODUCTS`], each with one image
pub struct ProductSeed;

#[async_trait]
impl SeedData for ProductSeed {
    async fn insert_seed_data(&self, pool: &SqlitePool) -> Result<usize> {
        insert_seed_data(pool, SEED_PRODUCTS).await
    }
}

pub async fn insert_seed_data(pool: &SqlitePool, products: &[SeedProduct]) -> Result<usize> {
    tracing::info!("Inserting seed data: {} products", products.len());

    let product_repo = ProductRepository::new(pool.clone());
    let image_repo = ProductImageRepository::new(pool.clone());

    for seed in products {
        tracing::info!("Adding product: {}", seed.name);

        let image_id = image_repo
            .create(&ProductImage::new(
                seed.image_url.to_string(),
                seed.description.to_string(),
            ))
            .await
            .with_context(|| format!("Failed to insert image for {}", seed.name))?;

        let product_id = product_repo
            .create(&Product::new(
                seed.name.to_string(),
                seed.description.to_string(),
                seed.status,
                seed.price,
            ))
            .await
            .with_context(|| format!("Failed to insert product {}", seed.name))?;

        image_repo.attach_to_product(image_id, product_id).await?;
    }

    tracing::info!("Seed data inserted: {} products", products.len());

    Ok(products.len())
}
