use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default cookie lifetime: 360 days
pub const DEFAULT_SESSION_MAX_AGE_SECONDS: i64 = 60 * 60 * 24 * 360;

/// Parameters of the stateless session mechanism
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub max_age: Duration,
    pub secret: String,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>, max_age: Duration) -> Self {
        Self {
            max_age,
            secret: secret.into(),
        }
    }

    pub fn with_default_max_age(secret: impl Into<String>) -> Self {
        Self::new(secret, Duration::seconds(DEFAULT_SESSION_MAX_AGE_SECONDS))
    }
}

/// Payload carried inside the signed session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub list_key: String,
    pub item_id: i64,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl SessionClaims {
    pub fn new(
        list_key: impl Into<String>,
        item_id: i64,
        issued_at: DateTime<Utc>,
        max_age: Duration,
    ) -> Result<Self> {
        let expires_at = issued_at
            .checked_add_signed(max_age)
            .ok_or_else(|| anyhow::anyhow!("Session max age {} overflows the clock", max_age))?;

        Ok(Self {
            list_key: list_key.into(),
            item_id,
            issued_at: issued_at.timestamp(),
            expires_at: expires_at.timestamp(),
        })
    }

    /// Accepted up to and including `expires_at`, rejected strictly after
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.expires_at
    }
}

/// Item data attached to a session (`User: id`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionData {
    pub id: i64,
}

/// A decoded session. `data` is `None` when the referenced item could not be
/// loaded, e.g. the user was deleted after the cookie was issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub list_key: String,
    pub item_id: i64,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn from_claims(claims: &SessionClaims, data: Option<SessionData>) -> Self {
        Self {
            list_key: claims.list_key.clone(),
            item_id: claims.item_id,
            data,
        }
    }
}

/// What downstream code sees about the requester
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SessionState {
    pub authenticated: bool,
    pub user_id: Option<i64>,
}

impl SessionState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: i64) -> Self {
        Self {
            authenticated: true,
            user_id: Some(user_id),
        }
    }

    pub fn from_session(session: Option<&Session>) -> Self {
        match session.and_then(|s| s.data) {
            Some(data) => Self::authenticated(data.id),
            None => Self::anonymous(),
        }
    }
}

/// Admin UI gate: a session must exist and carry item data.
pub fn is_access_allowed(session: Option<&Session>) -> bool {
    session.is_some_and(|s| s.data.is_some())
}
