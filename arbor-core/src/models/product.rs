use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Available,
    Unavailable,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Available => "available",
            ProductStatus::Unavailable => "unavailable",
        }
    }

    pub fn all() -> Vec<ProductStatus> {
        vec![
            ProductStatus::Draft,
            ProductStatus::Available,
            ProductStatus::Unavailable,
        ]
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(ProductStatus::Draft),
            "available" => Ok(ProductStatus::Available),
            "unavailable" => Ok(ProductStatus::Unavailable),
            other => Err(format!("Invalid product status '{}'", other)),
        }
    }
}

/// A sellable item. Prices are stored in minor units (cents).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub status: ProductStatus,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: String, description: String, status: ProductStatus, price: i64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            description,
            status,
            price,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate_name(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name cannot be empty".to_string());
        }

        if self.name.len() > 255 {
            return Err("Name cannot exceed 255 characters".to_string());
        }

        Ok(())
    }

    pub fn validate_price(&self) -> Result<(), String> {
        if self.price < 0 {
            return Err("Price cannot be negative".to_string());
        }

        Ok(())
    }

    pub fn is_valid(&self) -> Result<(), String> {
        self.validate_name()?;
        self.validate_price()?;
        Ok(())
    }
}
