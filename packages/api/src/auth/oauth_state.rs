//! The transient `{state, codeVerifier}` pair carried in the `oauth_state` cookie
//! between "give me a login URL" and the provider's callback.

use serde::{Deserialize, Serialize};

use super::pkce::{generate_code_verifier, generate_state, is_valid_code_verifier, is_valid_state};
use super::AuthError;
use crate::crypto::{self, SessionKey};

const KIND: &str = "oauth_state";

/// One login attempt's CSRF state and PKCE verifier.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthState {
    pub state: String,
    pub code_verifier: String,
}

impl OAuthState {
    /// Fresh random state and verifier for a new login attempt.
    pub fn new_random() -> Self {
        Self {
            state: generate_state(),
            code_verifier: generate_code_verifier(),
        }
    }

    /// Seal into an `oauth_state` cookie value.
    pub fn encode(&self, key: &SessionKey) -> Result<String, AuthError> {
        crypto::seal(key, KIND, self)
    }

    /// Open an `oauth_state` cookie value.
    ///
    /// A payload that decrypts but carries a malformed state or verifier is
    /// rejected as [`AuthError::Schema`], same as any other bad cookie.
    pub fn decode(key: &SessionKey, token: &str) -> Result<Self, AuthError> {
        let decoded: Self = crypto::open(key, KIND, token)?;
        if !is_valid_state(&decoded.state) || !is_valid_code_verifier(&decoded.code_verifier) {
            return Err(AuthError::Schema);
        }
        Ok(decoded)
    }
}

impl std::fmt::Debug for OAuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthState")
            .field("state", &self.state)
            .field("code_verifier", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::{SessionData, SessionUser};

    #[test]
    fn test_encode_decode() {
        let key = SessionKey::generate();
        let original = OAuthState::new_random();
        let token = original.encode(&key).unwrap();
        assert_eq!(OAuthState::decode(&key, &token).unwrap(), original);
    }

    #[test]
    fn test_decode_rejects_malformed_fields() {
        let key = SessionKey::generate();

        let bad_state = OAuthState {
            state: "not-hex".to_string(),
            code_verifier: generate_code_verifier(),
        };
        let token = crypto::seal(&key, KIND, &bad_state).unwrap();
        assert!(matches!(
            OAuthState::decode(&key, &token),
            Err(AuthError::Schema)
        ));

        let short_verifier = OAuthState {
            state: generate_state(),
            code_verifier: "abc".to_string(),
        };
        let token = crypto::seal(&key, KIND, &short_verifier).unwrap();
        assert!(matches!(
            OAuthState::decode(&key, &token),
            Err(AuthError::Schema)
        ));
    }

    #[test]
    fn test_session_token_is_not_an_oauth_state() {
        let key = SessionKey::generate();
        let session = SessionData::new(
            SessionUser {
                provider_id: "1".to_string(),
                email: "a@example.com".to_string(),
                name: "A".to_string(),
                picture: String::new(),
            },
            "tok".to_string(),
            None,
            3600,
        );
        let token = session.encode(&key).unwrap();
        assert!(matches!(
            OAuthState::decode(&key, &token),
            Err(AuthError::Schema)
        ));
    }

    #[test]
    fn test_debug_redacts_verifier() {
        let state = OAuthState::new_random();
        let shown = format!("{state:?}");
        assert!(!shown.contains(&state.code_verifier));
    }
}
