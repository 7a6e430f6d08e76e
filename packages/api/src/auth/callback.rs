//! # OAuth callback — `GET /auth/callback`
//!
//! The provider sends the browser here with `code` and `state` (or `error`). The
//! handler runs a fixed sequence of guarded steps, each of which either advances
//! or ends the attempt with a [`CallbackFailure`]:
//!
//! | Step | Check | Failure code |
//! |------|-------|--------------|
//! | 1 | provider sent `error` | the provider's code, if safe, else `provider_error` |
//! | 2 | `code` and `state` present | `missing_params` |
//! | 3 | `oauth_state` cookie present | `missing_state` |
//! | 4 | cookie opens as an [`OAuthState`] | `invalid_state` |
//! | 5 | cookie state equals query state | `state_mismatch` |
//! | 6 | token exchange succeeds | `auth_failed` |
//! | 7 | userinfo succeeds, email verified | `auth_failed` |
//! | 8 | session sealed | `auth_failed` |
//!
//! The result is a [`CallbackOutcome`]. Every outcome becomes a `302` to the
//! frontend (with `?error=<code>` when rejected) and clears `oauth_state`. Only
//! [`CallbackOutcome::LoggedIn`] sets the `session` cookie.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info, warn};
use url::Url;

use super::cookies::{clear_cookie, session_cookie, OAUTH_STATE_COOKIE};
use super::{AuthConfig, AuthError, GoogleOAuth, OAuthState, SessionData};
use crate::state::AppState;

const MAX_PROVIDER_ERROR_LEN: usize = 64;

/// Query string the provider redirects back with.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Why a login attempt was rejected. [`code`](Self::code) is what the frontend sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackFailure {
    /// The provider reported an error; holds the sanitized code.
    Provider(String),
    MissingParams,
    MissingState,
    InvalidState,
    StateMismatch,
    AuthFailed,
}

impl CallbackFailure {
    /// Provider error code passed through only when it is short and plain.
    pub fn provider(raw: &str) -> Self {
        let safe = !raw.is_empty()
            && raw.len() <= MAX_PROVIDER_ERROR_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
        if safe {
            Self::Provider(raw.to_string())
        } else {
            Self::Provider("provider_error".to_string())
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Provider(code) => code,
            Self::MissingParams => "missing_params",
            Self::MissingState => "missing_state",
            Self::InvalidState => "invalid_state",
            Self::StateMismatch => "state_mismatch",
            Self::AuthFailed => "auth_failed",
        }
    }
}

/// Terminal result of one callback.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// `sealed` is the `session` cookie value for `session`.
    LoggedIn { session: SessionData, sealed: String },
    Rejected(CallbackFailure),
}

impl CallbackOutcome {
    /// The frontend URL, with `?error=<code>` appended on rejection.
    pub fn redirect_location(&self, frontend_url: &Url) -> String {
        let mut location = frontend_url.clone();
        if let Self::Rejected(failure) = self {
            location
                .query_pairs_mut()
                .append_pair("error", failure.code());
        }
        location.to_string()
    }

    /// Redirect response carrying the cookie changes for this outcome.
    pub fn into_response(self, auth: &AuthConfig, jar: CookieJar) -> Response {
        let location = self.redirect_location(&auth.frontend_url);
        let mut jar = jar.add(clear_cookie(OAUTH_STATE_COOKIE, auth.secure_cookies));
        if let Self::LoggedIn { sealed, .. } = self {
            jar = jar.add(session_cookie(sealed, auth.secure_cookies));
        }
        (StatusCode::FOUND, jar, [(header::LOCATION, location)]).into_response()
    }
}

/// Run the callback steps against the query and the `oauth_state` cookie value.
pub async fn run(
    auth: &AuthConfig,
    google: &GoogleOAuth,
    query: CallbackQuery,
    state_cookie: Option<&str>,
) -> CallbackOutcome {
    match authenticate(auth, google, query, state_cookie).await {
        Ok((session, sealed)) => CallbackOutcome::LoggedIn { session, sealed },
        Err(failure) => CallbackOutcome::Rejected(failure),
    }
}

async fn authenticate(
    auth: &AuthConfig,
    google: &GoogleOAuth,
    query: CallbackQuery,
    state_cookie: Option<&str>,
) -> Result<(SessionData, String), CallbackFailure> {
    if let Some(provider_error) = query.error {
        return Err(CallbackFailure::provider(&provider_error));
    }

    let (Some(code), Some(state)) = (non_empty(query.code), non_empty(query.state)) else {
        return Err(CallbackFailure::MissingParams);
    };

    let token = state_cookie
        .filter(|v| !v.is_empty())
        .ok_or(CallbackFailure::MissingState)?;

    let stored = OAuthState::decode(&auth.session_key, token).map_err(|e| {
        warn!("oauth_state cookie rejected: {e}");
        CallbackFailure::InvalidState
    })?;

    if stored.state != state {
        return Err(CallbackFailure::StateMismatch);
    }

    let tokens = google
        .exchange_code(&code, &stored.code_verifier)
        .await
        .map_err(|e| auth_failed("token exchange", e))?;

    let user = google
        .fetch_user(&tokens.access_token)
        .await
        .map_err(|e| auth_failed("userinfo", e))?;

    let session = SessionData::new(
        user.to_session_user(),
        tokens.access_token,
        tokens.refresh_token,
        i64::from(tokens.expires_in),
    );
    let sealed = session
        .encode(&auth.session_key)
        .map_err(|e| auth_failed("session seal", e))?;

    Ok((session, sealed))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn auth_failed(step: &str, err: AuthError) -> CallbackFailure {
    match &err {
        AuthError::Provider { status, body } => {
            error!("{step} failed: status={status:?} body={body}");
        }
        _ => warn!("{step} failed: {err}"),
    }
    CallbackFailure::AuthFailed
}

/// `GET /auth/callback`
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Response {
    // an unparseable query still ends in a redirect, as missing_params
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let state_cookie = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let outcome = run(&state.auth, &state.google, query, state_cookie.as_deref()).await;

    match &outcome {
        CallbackOutcome::LoggedIn { session, .. } => {
            info!(provider_id = %session.user.provider_id, "login succeeded");
        }
        CallbackOutcome::Rejected(failure) => {
            warn!(code = failure.code(), "login rejected");
        }
    }

    outcome.into_response(&state.auth, jar)
}
