//! Registry of the content types ("lists") exposed through the API and the
//! admin surface.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{product::ProductStatus, role::Role};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Password,
    Integer,
    Timestamp,
    Select { options: Vec<String> },
    Relationship { list: String, many: bool },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    pub unique: bool,
}

impl FieldDefinition {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            unique: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListDefinition {
    pub key: String,
    pub plural: String,
    pub path: String,
    pub fields: Vec<FieldDefinition>,
}

impl ListDefinition {
    pub fn new(key: &str, plural: &str, path: &str) -> Self {
        Self {
            key: key.to_string(),
            plural: plural.to_string(),
            path: path.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ListRegistry {
    lists: BTreeMap<String, ListDefinition>,
}

impl ListRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a list, replacing any previous definition with the same key
    pub fn register(mut self, list: ListDefinition) -> Self {
        self.lists.insert(list.key.clone(), list);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ListDefinition> {
        self.lists.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// The three lists served by the storefront backend
    pub fn storefront() -> Self {
        Self::new()
            .register(user_list())
            .register(product_list())
            .register(product_image_list())
    }
}

fn user_list() -> ListDefinition {
    ListDefinition::new("User", "Users", "users")
        .field(FieldDefinition::new("name", FieldKind::Text).required())
        .field(FieldDefinition::new("email", FieldKind::Text).required().unique())
        .field(FieldDefinition::new("password", FieldKind::Password).required())
        .field(FieldDefinition::new(
            "role",
            FieldKind::Select {
                options: Role::all().iter().map(|r| r.as_str().to_string()).collect(),
            },
        ))
}

fn product_list() -> ListDefinition {
    ListDefinition::new("Product", "Products", "products")
        .field(FieldDefinition::new("name", FieldKind::Text).required())
        .field(FieldDefinition::new("description", FieldKind::Text))
        .field(FieldDefinition::new(
            "photos",
            FieldKind::Relationship {
                list: "ProductImage".to_string(),
                many: true,
            },
        ))
        .field(FieldDefinition::new(
            "status",
            FieldKind::Select {
                options: ProductStatus::all()
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            },
        ))
        .field(FieldDefinition::new("price", FieldKind::Integer))
}

fn product_image_list() -> ListDefinition {
    ListDefinition::new("ProductImage", "Product Images", "product-images")
        .field(FieldDefinition::new("image_url", FieldKind::Text).required())
        .field(FieldDefinition::new("alt_text", FieldKind::Text))
        .field(FieldDefinition::new(
            "product",
            FieldKind::Relationship {
                list: "Product".to_string(),
                many: false,
            },
        ))
}
