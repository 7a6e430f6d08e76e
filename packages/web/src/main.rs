use std::net::SocketAddr;
use std::sync::Arc;

use api::auth::AuthConfig;
use api::db::{MemoryNoteStore, NoteStore, PgNoteStore};
use api::settings::Settings;
use api::AppState;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::new().expect("Failed to load configuration");

    // Refuse to serve with a missing or malformed secret or client credentials
    let auth = AuthConfig::from_settings(&settings).expect("Invalid auth configuration");

    let notes: Arc<dyn NoteStore> = match settings.database_url() {
        Some(url) => {
            let pool = api::db::connect(url)
                .await
                .expect("Failed to connect to database");
            api::db::migrate(&pool)
                .await
                .expect("Failed to run migrations");
            Arc::new(PgNoteStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, notes are kept in memory");
            Arc::new(MemoryNoteStore::new())
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(
            auth.frontend_origin()
                .parse::<HeaderValue>()
                .expect("FRONTEND_URL is not a valid origin"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let state = AppState::new(auth, notes).expect("Failed to build application state");
    let router = api::router(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .await
        .expect("Server error");
}
