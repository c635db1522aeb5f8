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

//! Stateless signed sessions.
//!
//! A token is `base64url(json claims) "." base64url(hmac_sha256(payload))`.
//! Nothing is stored server side; logging out only removes the cookie.

use anyhow::{Context, Result};
use arbor_core::models::{
    auth::AuthConfig,
    session::{Session, SessionClaims, SessionConfig, SessionData},
};
use arbor_db::repositories::UserRepository;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sqlx::SqlitePool;
use std::{fmt, sync::Arc};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE_NAME: &str = "arbor-session";

#[derive(Clone)]
pub struct SessionSigner {
    secret: Arc<[u8]>,
    max_age: Duration,
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner")
            .field("secret", &"<redacted>")
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl SessionSigner {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secret: Arc::from(config.secret.as_bytes()),
            max_age: config.max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn issue(&self, list_key: &str, item_id: i64) -> Result<String> {
        self.issue_at(list_key, item_id, Utc::now())
    }

    pub fn issue_at(&self, list_key: &str, item_id: i64, now: DateTime<Utc>) -> Result<String> {
        let claims = SessionClaims::new(list_key, item_id, now, self.max_age)?;
        let payload = serde_json::to_vec(&claims).context("Failed to encode session claims")?;
        let encoded = URL_SAFE_NO_PAD.encode(&payload);

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", encoded, signature))
    }

    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        self.verify_at(token, Utc::now())
    }

    /// `None` for malformed, tampered or expired tokens
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<SessionClaims> {
        let (encoded, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(encoded.as_bytes());
        // Constant-time comparison
        mac.verify_slice(&signature).ok()?;

        let payload = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let claims: SessionClaims = serde_json::from_slice(&payload).ok()?;

        if claims.is_expired_at(now) {
            return None;
        }

        Some(claims)
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| anyhow::anyhow!("Invalid session secret: {}", e))
    }
}

pub fn session_cookie(token: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(max_age.num_seconds()))
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME).path("/").build()
}

/// Decode the session cookie and attach the user's item data.
///
/// Any problem with the token itself downgrades to `None`; only storage
/// failures are errors.
pub async fn load_session(
    db: &SqlitePool,
    signer: &SessionSigner,
    auth: &AuthConfig,
    jar: &CookieJar,
) -> Result<Option<Session>> {
    let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
        return Ok(None);
    };

    let Some(claims) = signer.verify(cookie.value()) else {
        tracing::debug!("Ignoring invalid or expired session cookie");
        return Ok(None);
    };

    if claims.list_key != auth.list_key {
        tracing::debug!(list_key = %claims.list_key, "Session references an unknown list");
        return Ok(None);
    }

    let user_repo = UserRepository::new(db.clone());
    let data = user_repo
        .exists(claims.item_id)
        .await?
        .then_some(SessionData { id: claims.item_id });

    Ok(Some(Session::from_claims(&claims, data)))
}
