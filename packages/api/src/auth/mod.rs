//! Authentication: Google OAuth with PKCE, sealed cookies, and the per-request
//! identity gate.

pub mod callback;
mod config;
pub mod cookies;
mod error;
pub mod gate;
mod google;
mod oauth_state;
pub mod pkce;
mod session;

pub use callback::{CallbackFailure, CallbackOutcome, CallbackQuery};
pub use config::{AuthConfig, OAuthConfig};
pub use error::AuthError;
pub use gate::{auth_context, CurrentUser, Identity, RequireUser};
pub use google::{GoogleOAuth, TokenResponse};
pub use oauth_state::OAuthState;
pub use session::{SessionData, SessionUser};
