//! Postgres connection pool.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Open a pool of up to 5 connections to `database_url`.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Apply the migrations in `packages/api/migrations`.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
