//! Builders for the two auth cookies.
//!
//! Both are `HttpOnly` with `Path=/`. In production they are `Secure` with
//! `SameSite=None` so a frontend on another origin can send them with credentialed
//! requests; elsewhere they are `SameSite=Lax` without `Secure`.

use axum_extra::extract::cookie::{Cookie, SameSite};

/// Carries the sealed [`OAuthState`](super::OAuthState) across the provider round-trip.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
/// Carries the sealed [`SessionData`](super::SessionData).
pub const SESSION_COOKIE: &str = "session";

pub const OAUTH_STATE_MAX_AGE_SECS: i64 = 10 * 60;
pub const SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

fn build(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(if secure { SameSite::None } else { SameSite::Lax })
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

pub fn oauth_state_cookie(value: String, secure: bool) -> Cookie<'static> {
    build(OAUTH_STATE_COOKIE, value, OAUTH_STATE_MAX_AGE_SECS, secure)
}

pub fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    build(SESSION_COOKIE, value, SESSION_MAX_AGE_SECS, secure)
}

/// Expired cookie that makes the browser drop `name`.
///
/// Attributes match the ones the cookie was set with, otherwise some browsers
/// keep the original.
pub fn clear_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    build(name, String::new(), 0, secure)
}
