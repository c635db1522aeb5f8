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
    role::Role,
    session::{is_access_allowed, Session, SessionState},
    user::User,
};
use arbor_db::repositories::UserRepository;
use axum::{
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{error::AppError, session::load_session, AppState};

/// The decoded session of the current request, if any. Never rejects on a
/// bad or missing cookie.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub session: Option<Session>,
    pub state: SessionState,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let session = load_session(&app_state.db, &app_state.sessions, &app_state.auth, &jar).await?;
        let session_state = SessionState::from_session(session.as_ref());

        Ok(CurrentSession {
            session,
            state: session_state,
        })
    }
}

/// Current authenticated user, extracted from request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession { session, .. } = CurrentSession::from_request_parts(parts, state).await?;

        let session = session.ok_or_else(|| AppError::unauthorized("Not signed in"))?;
        let data = session
            .data
            .ok_or_else(|| AppError::unauthorized("Session user no longer exists"))?;

        let app_state = AppState::from_ref(state);
        let user = UserRepository::new(app_state.db.clone())
            .find_by_id(data.id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Session user no longer exists"))?;

        Ok(CurrentUser { user, session })
    }
}

async fn require_role<S>(
    parts: &mut Parts,
    state: &S,
    allowed: fn(&Role) -> bool,
    role: Role,
) -> Result<User, AppError>
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    let CurrentUser { user, .. } = CurrentUser::from_request_parts(parts, state).await?;

    if !allowed(&user.role) {
        return Err(AppError::forbidden(format!("{} role required", role)));
    }

    Ok(user)
}

/// Require a user allowed to manage products
#[derive(Debug, Clone)]
pub struct RequireEditor(pub User);

impl<S> FromRequestParts<S> for RequireEditor
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::can_edit, Role::Editor).await.map(RequireEditor)
    }
}

/// Require admin user
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::can_manage_users, Role::Admin).await.map(RequireAdmin)
    }
}

/// Gate for the admin surface, driven solely by [`is_access_allowed`]
pub async fn admin_access_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let session = load_session(&state.db, &state.sessions, &state.auth, &jar).await?;

    if !is_access_allowed(session.as_ref()) {
        return Err(AppError::unauthorized("Sign in to access the admin area"));
    }

    Ok(next.run(request).await)
}
