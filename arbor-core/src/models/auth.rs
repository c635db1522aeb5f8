use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use super::role::Role;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown identity and wrong secret are reported identically
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An initial user already exists")]
    AlreadyInitialized,
    #[error("First-item bootstrap is disabled")]
    InitDisabled,
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("{0}")]
    Invalid(String),
}

/// Fields prompted for when no identity item exists yet
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InitFirstItem {
    pub fields: Vec<String>,
    pub role: Role,
}

impl Default for InitFirstItem {
    fn default() -> Self {
        Self {
            fields: vec![
                "name".to_string(),
                "email".to_string(),
                "password".to_string(),
            ],
            role: Role::Admin,
        }
    }
}

/// Which list holds users and which of its fields are used for login
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthConfig {
    pub list_key: String,
    pub identity_field: String,
    pub secret_field: String,
    pub init_first_item: Option<InitFirstItem>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            list_key: "User".to_string(),
            identity_field: "email".to_string(),
            secret_field: "password".to_string(),
            init_first_item: Some(InitFirstItem::default()),
        }
    }
}

impl AuthConfig {
    /// Check a first-item submission against the configured field list and
    /// return the role the new item receives.
    pub fn validate_first_item(&self, input: &HashMap<String, String>) -> Result<Role, AuthError> {
        let init = self
            .init_first_item
            .as_ref()
            .ok_or(AuthError::InitDisabled)?;

        for field in &init.fields {
            let present = input
                .get(field)
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false);
            if !present {
                return Err(AuthError::MissingField(field.clone()));
            }
        }

        Ok(init.role)
    }

    /// Pull the identity/secret pair out of a login submission
    pub fn credentials<'a>(
        &self,
        input: &'a HashMap<String, String>,
    ) -> Result<(&'a str, &'a str), AuthError> {
        let identity = input
            .get(&self.identity_field)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::MissingField(self.identity_field.clone()))?;
        let secret = input
            .get(&self.secret_field)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::MissingField(self.secret_field.clone()))?;

        Ok((identity, secret))
    }
}
