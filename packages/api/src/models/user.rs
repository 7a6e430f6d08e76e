//! # User models — provider identity and its client-safe projection
//!
//! ## [`GoogleUser`]
//!
//! The deserialization target for the provider's userinfo endpoint
//! (`googleapis.com/oauth2/v2/userinfo`). `verified_email` is checked before a
//! session is ever issued; see [`GoogleUser::verified`]. `name` and `picture`
//! default to empty strings because the provider omits them for some accounts.
//!
//! ## [`UserInfo`]
//!
//! What the identity query returns to the browser: the provider id, email, name
//! and picture. It never carries tokens.

use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, SessionUser};

/// User profile as returned by the provider's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoogleUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

impl GoogleUser {
    /// Accept only identities with an id, an email, and a provider-verified email.
    pub fn verified(self) -> Result<Self, AuthError> {
        if self.id.is_empty() || self.email.is_empty() {
            return Err(AuthError::Provider {
                status: None,
                body: "userinfo response is missing id or email".to_string(),
            });
        }
        if !self.verified_email {
            return Err(AuthError::UnverifiedEmail);
        }
        Ok(self)
    }

    /// The subset of the profile stored in the session cookie.
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            provider_id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            picture: self.picture.clone(),
        }
    }
}

/// User information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub provider_id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn google_user(verified: bool) -> GoogleUser {
        serde_json::from_value(serde_json::json!({
            "id": "1234567890",
            "email": "ada@example.com",
            "verified_email": verified,
            "name": "Ada Lovelace",
            "given_name": "Ada",
            "family_name": "Lovelace",
            "picture": "https://example.com/ada.png"
        }))
        .unwrap()
    }

    #[test]
    fn test_verified_user_is_accepted() {
        let user = google_user(true).verified().unwrap();
        let session_user = user.to_session_user();
        assert_eq!(session_user.provider_id, "1234567890");
        assert_eq!(session_user.email, "ada@example.com");
    }

    #[test]
    fn test_unverified_user_is_rejected() {
        let err = google_user(false).verified().unwrap_err();
        assert!(matches!(err, AuthError::UnverifiedEmail));
    }

    #[test]
    fn test_missing_verified_flag_counts_as_unverified() {
        let user: GoogleUser =
            serde_json::from_str(r#"{"id":"1","email":"a@example.com"}"#).unwrap();
        assert!(matches!(user.verified(), Err(AuthError::UnverifiedEmail)));
    }

    #[test]
    fn test_empty_email_is_rejected() {
        let mut user = google_user(true);
        user.email.clear();
        assert!(matches!(user.verified(), Err(AuthError::Provider { .. })));
    }

    #[test]
    fn test_client_projection_keeps_only_profile_fields() {
        // given_name and family_name in the payload are ignored
        let info = google_user(true).to_session_user().to_info();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "providerId": "1234567890",
                "email": "ada@example.com",
                "name": "Ada Lovelace",
                "picture": "https://example.com/ada.png"
            })
        );
    }
}
