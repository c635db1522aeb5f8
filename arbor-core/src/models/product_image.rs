use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image metadata owned by a product. The binary itself lives wherever
/// `image_url` points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    pub id: Option<i64>,
    pub product_id: Option<i64>,
    pub image_url: String,
    pub alt_text: String,
    pub created_at: DateTime<Utc>,
}

impl ProductImage {
    pub fn new(image_url: String, alt_text: String) -> Self {
        Self {
            id: None,
            product_id: None,
            image_url,
            alt_text,
            created_at: Utc::now(),
        }
    }

    pub fn for_product(product_id: i64, image_url: String, alt_text: String) -> Self {
        Self {
            product_id: Some(product_id),
            ..Self::new(image_url, alt_text)
        }
    }

    pub fn is_valid(&self) -> Result<(), String> {
        if self.image_url.trim().is_empty() {
            return Err("Image URL cannot be empty".to_string());
        }

        if self.image_url.chars().any(char::is_whitespace) {
            return Err("Image URL cannot contain whitespace".to_string());
        }

        if self.alt_text.len() > 500 {
            return Err("Alt text cannot exceed 500 characters".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_image_is_unowned() {
        let image = ProductImage::new("https://img.example.com/a.jpg".to_string(), "A".to_string());
        assert!(image.product_id.is_none());
        assert!(image.is_valid().is_ok());
    }

    #[test]
    fn test_for_product() {
        let image = ProductImage::for_product(7, "/images/a.jpg".to_string(), String::new());
        assert_eq!(image.product_id, Some(7));
    }

    #[test]
    fn test_invalid_urls() {
        assert!(ProductImage::new(String::new(), String::new()).is_valid().is_err());
        assert!(ProductImage::new("a b.jpg".to_string(), String::new())
            .is_valid()
            .is_err());
    }

    #[test]
    fn test_alt_text_too_long() {
        let image = ProductImage::new("a.jpg".to_string(), "x".repeat(501));
        assert!(image.is_valid().unwrap_err().contains("500"));
    }
}
