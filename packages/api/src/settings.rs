//! Layered process configuration: defaults, then an optional `config.toml`,
//! then environment variables (`SESSION_SECRET`, `GOOGLE_CLIENT_ID`, ...).

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(unused)]
pub struct Settings {
    /// 64 hex chars; validated by [`crate::auth::AuthConfig::from_settings`].
    pub session_secret: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_auth_url: String,
    pub google_token_url: String,
    pub google_userinfo_url: String,
    /// Public origin of this server. The OAuth redirect URI is derived from it.
    pub api_url: String,
    /// Application origin every callback redirects to.
    pub frontend_url: String,
    /// `production` turns on `Secure` / `SameSite=None` cookies.
    pub app_env: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub provider_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("session_secret", "")?
            .set_default("google_client_id", "")?
            .set_default("google_client_secret", "")?
            .set_default(
                "google_auth_url",
                "https://accounts.google.com/o/oauth2/v2/auth",
            )?
            .set_default("google_token_url", "https://oauth2.googleapis.com/token")?
            .set_default(
                "google_userinfo_url",
                "https://www.googleapis.com/oauth2/v2/userinfo",
            )?
            .set_default("api_url", "http://localhost:3001")?
            .set_default("frontend_url", "http://localhost:5173")?
            .set_default("app_env", "development")?
            .set_default("port", 3001)?
            .set_default("provider_timeout_secs", 10)?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::default())
            .build()?;

        config.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// `DATABASE_URL`, ignoring an empty value.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.is_empty())
    }

    /// The fixed callback endpoint registered with the provider.
    pub fn redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.api_url.trim_end_matches('/'))
    }
}
