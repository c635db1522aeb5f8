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

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_REQUEST_METHOD, ACCESS_CONTROL_MAX_AGE, ORIGIN, VARY,
        },
        HeaderMap, HeaderValue, Method, Request, Response, StatusCode,
    },
    middleware::Next,
};
use std::sync::Arc;

use crate::config::Config;

/// Which browser origins may make credentialed requests
#[derive(Debug, Clone, PartialEq)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>, allow_credentials: bool) -> Self {
        Self {
            allowed_origins: allowed_origins
                .into_iter()
                .map(|origin| normalize_origin(&origin).to_string())
                .collect(),
            allow_credentials,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.allowed_origins(), true)
    }

    pub fn allows(&self, origin: &str) -> bool {
        let origin = normalize_origin(origin);
        !origin.is_empty() && self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    fn apply(&self, origin: &HeaderValue, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        if self.allow_credentials {
            headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
    }
}

fn normalize_origin(origin: &str) -> &str {
    origin.trim().trim_end_matches('/')
}

/// CORS middleware: reflects the origin only when it is on the allow list
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response<Body>, StatusCode> {
    let origin = request.headers().get(ORIGIN).cloned();
    let allowed = origin
        .as_ref()
        .and_then(|value| value.to_str().ok())
        .map(|value| policy.allows(value))
        .unwrap_or(false);

    // Handle OPTIONS preflight requests
    let is_preflight = request.method() == Method::OPTIONS
        && request.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD);

    if is_preflight {
        let mut response = Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Body::empty())
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let headers = response.headers_mut();
        headers.append(VARY, HeaderValue::from_static("Origin"));

        if let (true, Some(origin)) = (allowed, origin.as_ref()) {
            policy.apply(origin, headers);
            headers.insert(
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST, PUT, PATCH, DELETE, OPTIONS"),
            );
            headers.insert(
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type, Authorization, Accept"),
            );
            headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400")); // 24 hours
        } else {
            tracing::debug!(origin = ?origin, "Rejected CORS preflight");
        }

        return Ok(response);
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.append(VARY, HeaderValue::from_static("Origin"));
    if let (true, Some(origin)) = (allowed, origin.as_ref()) {
        policy.apply(origin, headers);
    }

    Ok(response)
}
