//! Failure taxonomy for the login flow and the cookie envelopes.

use thiserror::Error;

/// Everything that can go wrong between "give me a login URL" and "who is this request".
///
/// None of these variants carry decrypted payload contents. [`AuthError::Provider`]
/// keeps the upstream body for logging only; its `Display` output omits it.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Startup-time misconfiguration: missing or malformed secret, credentials or URLs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The token did not split into exactly three decodable segments.
    #[error("malformed envelope")]
    MalformedEnvelope,

    /// Authenticated decryption failed (tampering, wrong key, corruption).
    #[error("envelope failed integrity check")]
    Integrity,

    /// Decryption succeeded but the payload is not the expected kind or shape.
    #[error("envelope payload does not match the expected schema")]
    Schema,

    /// The identity provider answered with a non-success status, an unparseable
    /// body, or not at all (transport error or timeout).
    #[error("identity provider request failed (status: {status:?})")]
    Provider { status: Option<u16>, body: String },

    /// The provider did not vouch for the user's email address.
    #[error("identity provider reports an unverified email address")]
    UnverifiedEmail,

    /// A protected operation was called without an authenticated identity.
    #[error("unauthorized")]
    Unauthorized,
}

impl AuthError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// True for the three envelope failures that indicate a bad or forged cookie.
    pub fn is_envelope_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedEnvelope | Self::Integrity | Self::Schema
        )
    }
}
