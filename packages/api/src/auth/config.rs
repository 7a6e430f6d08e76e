//! Validated authentication configuration, built once at startup.

use std::time::Duration;

use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use url::Url;

use super::AuthError;
use crate::crypto::SessionKey;
use crate::settings::Settings;

/// OAuth provider configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub userinfo_url: Url,
    pub redirect_url: RedirectUrl,
}

impl OAuthConfig {
    /// Google OAuth config from settings.
    pub fn google(settings: &Settings) -> Result<Self, AuthError> {
        let client_id = required(&settings.google_client_id, "GOOGLE_CLIENT_ID")?;
        let client_secret = required(&settings.google_client_secret, "GOOGLE_CLIENT_SECRET")?;

        Ok(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: AuthUrl::new(settings.google_auth_url.clone())
                .map_err(|e| AuthError::config(format!("GOOGLE_AUTH_URL: {e}")))?,
            token_url: TokenUrl::new(settings.google_token_url.clone())
                .map_err(|e| AuthError::config(format!("GOOGLE_TOKEN_URL: {e}")))?,
            userinfo_url: Url::parse(&settings.google_userinfo_url)
                .map_err(|e| AuthError::config(format!("GOOGLE_USERINFO_URL: {e}")))?,
            redirect_url: RedirectUrl::new(settings.redirect_uri())
                .map_err(|e| AuthError::config(format!("API_URL: {e}")))?,
        })
    }
}

/// Everything the login flow and the auth gate need, validated up front.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_key: SessionKey,
    pub google: OAuthConfig,
    /// Where every callback outcome redirects to.
    pub frontend_url: Url,
    /// `Secure` + `SameSite=None` when true, `SameSite=Lax` otherwise.
    pub secure_cookies: bool,
    /// Bound on each call to the provider.
    pub provider_timeout: Duration,
}

impl AuthConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, AuthError> {
        Ok(Self {
            session_key: SessionKey::from_hex(&settings.session_secret)?,
            google: OAuthConfig::google(settings)?,
            frontend_url: Url::parse(&settings.frontend_url)
                .map_err(|e| AuthError::config(format!("FRONTEND_URL: {e}")))?,
            secure_cookies: settings.is_production(),
            provider_timeout: Duration::from_secs(settings.provider_timeout_secs.max(1)),
        })
    }

    /// `scheme://host[:port]` of the frontend, as browsers send it in `Origin`.
    pub fn frontend_origin(&self) -> String {
        self.frontend_url.origin().ascii_serialization()
    }
}

fn required(value: &str, name: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::config(format!("{name} is required")));
    }
    Ok(value.to_string())
}
