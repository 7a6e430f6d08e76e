//! # Session data — the long-lived login carried in the `session` cookie
//!
//! There is no server-side session table. After a successful callback the
//! server seals a [`SessionData`] into the `session` cookie and reconstructs it
//! by decryption on every request.
//!
//! ## Two decode paths
//!
//! A missing cookie is normal; a cookie that fails to open is a tamper signal.
//! Callers pick the behaviour they need explicitly:
//!
//! - [`SessionData::decode`]: `Ok(None)` when no cookie is present, `Err` when a
//!   cookie is present but does not open. Used where a bad cookie must be told
//!   apart from no cookie.
//! - [`SessionData::decode_opportunistic`]: `None` for both. Used to build the
//!   ambient per-request identity, where either case simply means anonymous.
//!
//! ## Provider token expiry
//!
//! `expires_at` is the provider access-token expiry, not the session lifetime.
//! A session past `expires_at` still authenticates; it only means calls to the
//! provider with `access_token` will need a refresh first.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::crypto::{self, SessionKey};
use crate::models::UserInfo;

const KIND: &str = "session";

/// The user profile embedded in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub provider_id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
}

impl SessionUser {
    /// Client-safe projection.
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            provider_id: self.provider_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            picture: self.picture.clone(),
        }
    }
}

/// Everything the server knows about a logged-in browser.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user: SessionUser,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    /// Build a session from a fresh token grant, `expires_in` seconds from now.
    ///
    /// An empty refresh token is treated as no refresh capability.
    pub fn new(
        user: SessionUser,
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
    ) -> Self {
        Self {
            user,
            access_token,
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// True once `now` has reached `expires_at`.
    pub fn is_access_token_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_access_token_expired(&self) -> bool {
        self.is_access_token_expired_at(Utc::now())
    }

    /// Seal into a `session` cookie value.
    pub fn encode(&self, key: &SessionKey) -> Result<String, AuthError> {
        crypto::seal(key, KIND, self)
    }

    /// Strict decode: absent → `Ok(None)`, present but unopenable → `Err`.
    pub fn decode(key: &SessionKey, cookie: Option<&str>) -> Result<Option<Self>, AuthError> {
        match cookie {
            None | Some("") => Ok(None),
            Some(token) => crypto::open(key, KIND, token).map(Some),
        }
    }

    /// Lenient decode: absent and unopenable are both `None`.
    pub fn decode_opportunistic(key: &SessionKey, cookie: Option<&str>) -> Option<Self> {
        Self::decode(key, cookie).ok().flatten()
    }
}

impl std::fmt::Debug for SessionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionData")
            .field("user", &self.user)
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
