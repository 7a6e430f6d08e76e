//! # API crate — Google login, cookie sessions, and the notes endpoints
//!
//! Everything the `web` binary serves lives here. There is no server-side session
//! table: the login flow's transient state and the long-lived session are both
//! sealed with AES-256-GCM into cookies the browser holds.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | PKCE and CSRF state, the Google client, the callback state machine, the per-request identity gate |
//! | [`crypto`] | The sealed cookie envelope and the [`SessionKey`](crypto::SessionKey) |
//! | [`db`] | The [`NoteStore`](db::NoteStore) trait with Postgres and in-memory implementations |
//! | [`error`] | [`AppError`](error::AppError), the JSON error response |
//! | [`models`] | `Note`, the provider's `GoogleUser`, and the client-safe `UserInfo` |
//! | [`settings`] | Layered configuration: defaults, `config.toml`, environment |
//!
//! ## Routes
//!
//! [`router`] mounts `GET /auth/callback` outside the identity middleware; every
//! `/api` route runs behind [`auth::auth_context`].
//!
//! - **Authentication**: `get_login_url`, `get_current_user`, `get_session_status`, `logout`
//! - **Notes**: see [`notes`]
//! - **Health**: `health`

use axum::extract::State;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::warn;

pub mod auth;
pub mod crypto;
pub mod db;
pub mod error;
pub mod models;
pub mod notes;
pub mod settings;
pub mod state;

use auth::cookies::{clear_cookie, oauth_state_cookie, SESSION_COOKIE};
use auth::{auth_context, CurrentUser, OAuthState, SessionData};
use error::AppError;
pub use models::UserInfo;
pub use state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginUrl {
    pub url: String,
}

/// Result of an explicit session check.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub authenticated: bool,
    pub user: Option<UserInfo>,
    pub access_token_expired: bool,
    pub has_refresh_token: bool,
}

impl From<&SessionData> for SessionStatus {
    fn from(session: &SessionData) -> Self {
        Self {
            authenticated: true,
            user: Some(session.user.to_info()),
            access_token_expired: session.is_access_token_expired(),
            has_refresh_token: session.refresh_token().is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub db: bool,
}

/// Start a login: set the `oauth_state` cookie and return the provider URL.
pub async fn get_login_url(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LoginUrl>), AppError> {
    let oauth_state = OAuthState::new_random();
    let sealed = oauth_state.encode(&state.auth.session_key)?;
    let url = state.google.build_auth_url(&oauth_state);

    let jar = jar.add(oauth_state_cookie(sealed, state.auth.secure_cookies));
    Ok((jar, Json(LoginUrl { url })))
}

/// The current user, or `null` for anonymous callers.
pub async fn get_current_user(CurrentUser(session): CurrentUser) -> Json<Option<UserInfo>> {
    Json(session.map(|s| s.user.to_info()))
}

/// Strict session check. A cookie that fails to open is a 401 and is cleared.
pub async fn get_session_status(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SessionStatus>, (CookieJar, AppError)> {
    let cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    match SessionData::decode(&state.auth.session_key, cookie.as_deref()) {
        Ok(Some(session)) => Ok(Json(SessionStatus::from(&session))),
        Ok(None) => Ok(Json(SessionStatus::default())),
        Err(e) => {
            warn!("session cookie failed strict check: {e}");
            let jar = jar.add(clear_cookie(SESSION_COOKIE, state.auth.secure_cookies));
            Err((jar, AppError::unauthorized()))
        }
    }
}

/// Clear the `session` cookie. Safe to call when already logged out.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Success>) {
    let jar = jar.add(clear_cookie(SESSION_COOKIE, state.auth.secure_cookies));
    (jar, Json(Success { success: true }))
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        db: state.notes.ping().await,
    })
}

/// Every route the server exposes.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/auth/url", get(get_login_url))
        .route("/api/auth/me", get(get_current_user))
        .route("/api/auth/session", get(get_session_status))
        .route("/api/auth/logout", post(logout))
        .route("/api/health", get(health))
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/api/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_context));

    Router::new()
        .route("/auth/callback", get(auth::callback::callback))
        .merge(api)
        .with_state(state)
}
