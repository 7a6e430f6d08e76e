//! # Google OAuth 2.0 client
//!
//! Implements the three provider-facing steps of the Authorization Code flow with
//! PKCE. Nothing here touches cookies or persistence; the callback state machine
//! in [`super::callback`] sequences these calls.
//!
//! ## Types
//!
//! - [`TokenResponse`]: deserialization target for the token endpoint response.
//!   The refresh token is optional because the provider omits it on repeat consent.
//! - [`ConfiguredClient`]: a fully-typed `oauth2::Client` alias with auth and token
//!   endpoints set, used to build the authorization URL.
//! - [`GoogleOAuth`]: the handler that wraps an [`OAuthConfig`] and a `reqwest`
//!   client bounded by the configured provider timeout.
//!
//! ## Flow
//!
//! 1. **[`build_auth_url`](GoogleOAuth::build_auth_url)**: pure. Requests the
//!    `openid`, `email` and `profile` scopes, embeds the caller's state and the S256
//!    challenge derived from its verifier, and asks for offline access so a refresh
//!    token is issued. The redirect URI always comes from configuration.
//!
//! 2. **[`exchange_code`](GoogleOAuth::exchange_code)**: one form POST to the
//!    token endpoint with client credentials, the code, the PKCE verifier and the
//!    fixed redirect URI. No retries.
//!
//! 3. **[`fetch_user`](GoogleOAuth::fetch_user)**: one bearer GET to the userinfo
//!    endpoint. Identities without a provider-verified email are rejected.
//!
//! Every failure is an [`AuthError::Provider`] carrying the upstream status and body,
//! except the unverified-email policy rejection ([`AuthError::UnverifiedEmail`]).

use std::time::Duration;

use oauth2::basic::BasicClient;
use oauth2::{
    CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier, Scope,
};
use reqwest::Client;
use serde::Deserialize;

use super::config::OAuthConfig;
use super::{AuthError, OAuthState};
use crate::models::GoogleUser;

const SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Token endpoint response.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: u32,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Google OAuth handler.
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    config: OAuthConfig,
    http: Client,
}

impl GoogleOAuth {
    /// Create a handler whose provider calls give up after `timeout`.
    pub fn new(config: OAuthConfig, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    fn create_client(&self) -> ConfiguredClient {
        BasicClient::new(self.config.client_id.clone())
            .set_client_secret(self.config.client_secret.clone())
            .set_auth_uri(self.config.auth_url.clone())
            .set_token_uri(self.config.token_url.clone())
            .set_redirect_uri(self.config.redirect_url.clone())
    }

    /// Provider authorization URL for this login attempt.
    pub fn build_auth_url(&self, oauth_state: &OAuthState) -> String {
        let challenge = PkceCodeChallenge::from_code_verifier_sha256(&PkceCodeVerifier::new(
            oauth_state.code_verifier.clone(),
        ));
        let state = oauth_state.state.clone();

        let (auth_url, _csrf_state) = self
            .create_client()
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .set_pkce_challenge(challenge)
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url();

        auth_url.to_string()
    }

    /// Exchange an authorization code + PKCE verifier for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, AuthError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.secret().as_str()),
            ("code", code),
            ("code_verifier", code_verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_url.as_str()),
        ];

        let response = self
            .http
            .post(self.config.token_url.url().as_str())
            .form(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(AuthError::Provider {
                status: Some(status.as_u16()),
                body,
            });
        }

        // the body holds live tokens, so only the parse position is kept
        let tokens: TokenResponse = serde_json::from_str(&body).map_err(|e| AuthError::Provider {
            status: Some(status.as_u16()),
            body: format!(
                "token response failed validation at line {} column {}",
                e.line(),
                e.column()
            ),
        })?;
        if tokens.access_token.is_empty() {
            return Err(AuthError::Provider {
                status: Some(status.as_u16()),
                body: "token response has an empty access_token".to_string(),
            });
        }
        Ok(tokens)
    }

    /// Fetch the profile behind `access_token`, rejecting unverified emails.
    pub async fn fetch_user(&self, access_token: &str) -> Result<GoogleUser, AuthError> {
        let response = self
            .http
            .get(self.config.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(AuthError::Provider {
                status: Some(status.as_u16()),
                body,
            });
        }

        let user: GoogleUser = serde_json::from_str(&body).map_err(|e| AuthError::Provider {
            status: Some(status.as_u16()),
            body: format!("userinfo response failed validation: {e}"),
        })?;
        user.verified()
    }
}

fn transport_error(err: reqwest::Error) -> AuthError {
    let body = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.without_url().to_string()
    };
    AuthError::Provider { status: None, body }
}
