//! Shared handler state.

use std::sync::Arc;

use crate::auth::{AuthConfig, AuthError, GoogleOAuth};
use crate::db::NoteStore;

/// Cloned into every handler. Everything inside is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthConfig>,
    pub google: Arc<GoogleOAuth>,
    pub notes: Arc<dyn NoteStore>,
}

impl AppState {
    pub fn new(auth: AuthConfig, notes: Arc<dyn NoteStore>) -> Result<Self, AuthError> {
        let google = GoogleOAuth::new(auth.google.clone(), auth.provider_timeout)?;
        Ok(Self {
            auth: Arc::new(auth),
            google: Arc::new(google),
            notes,
        })
    }
}

#[cfg(test)]
impl AppState {
    /// Development-mode state over an in-memory store. Provider URLs point at a
    /// closed local port.
    pub(crate) fn for_tests() -> Self {
        let settings = crate::settings::Settings {
            session_secret: "2a".repeat(32),
            google_client_id: "client".to_string(),
            google_client_secret: "secret".to_string(),
            google_auth_url: "http://127.0.0.1:9/auth".to_string(),
            google_token_url: "http://127.0.0.1:9/token".to_string(),
            google_userinfo_url: "http://127.0.0.1:9/userinfo".to_string(),
            api_url: "http://localhost:3001".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            app_env: "development".to_string(),
            port: 3001,
            database_url: None,
            provider_timeout_secs: 1,
        };
        let auth = AuthConfig::from_settings(&settings).unwrap();
        Self::new(auth, Arc::new(crate::db::MemoryNoteStore::new())).unwrap()
    }
}
