//! Per-request identity.
//!
//! [`auth_context`] runs on every API request. It opens the `session` cookie with
//! the opportunistic decode and stores the result as an [`Identity`] in the
//! request extensions. A missing cookie and a cookie that fails to open both
//! yield [`Identity::Anonymous`].
//!
//! Handlers then pick an extractor:
//!
//! - [`CurrentUser`] never rejects; it yields `None` for anonymous requests.
//! - [`RequireUser`] rejects anonymous requests with 401 before the handler runs.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use super::cookies::SESSION_COOKIE;
use super::{AuthError, SessionData};
use crate::error::AppError;
use crate::state::AppState;

/// Who is making the request.
#[derive(Debug, Clone, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(SessionData),
}

impl Identity {
    pub fn from_cookies(state: &AppState, jar: &CookieJar) -> Self {
        let cookie = jar.get(SESSION_COOKIE).map(|c| c.value());
        match SessionData::decode_opportunistic(&state.auth.session_key, cookie) {
            Some(session) => Self::User(session),
            None => Self::Anonymous,
        }
    }

    pub fn session(&self) -> Option<&SessionData> {
        match self {
            Self::User(session) => Some(session),
            Self::Anonymous => None,
        }
    }
}

/// Middleware: attach the request's [`Identity`].
pub async fn auth_context(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = Identity::from_cookies(&state, &jar);
    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// The session behind the request, if any.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<SessionData>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Identity>()
            .and_then(Identity::session)
            .cloned();
        Ok(CurrentUser(session))
    }
}

/// The session behind the request; 401 when there is none.
///
/// Routes not behind [`auth_context`] have no identity and are always rejected.
#[derive(Debug, Clone)]
pub struct RequireUser(pub SessionData);

impl<S: Send + Sync> FromRequestParts<S> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Identity>() {
            Some(Identity::User(session)) => Ok(RequireUser(session.clone())),
            _ => Err(AuthError::Unauthorized.into()),
        }
    }
}
