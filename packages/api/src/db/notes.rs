//! Notes persistence.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::Note;

/// Storage for notes. Shared behind an `Arc<dyn NoteStore>`.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes, newest first.
    async fn list(&self) -> Result<Vec<Note>, sqlx::Error>;
    async fn get(&self, id: i64) -> Result<Option<Note>, sqlx::Error>;
    async fn create(&self, content: &str) -> Result<Note, sqlx::Error>;
    /// `None` when no note has `id`.
    async fn update(&self, id: i64, content: &str) -> Result<Option<Note>, sqlx::Error>;
    /// Deleting a missing note is not an error.
    async fn delete(&self, id: i64) -> Result<(), sqlx::Error>;
    /// True when the backing store answers.
    async fn ping(&self) -> bool;
}

/// [`NoteStore`] over the `notes` table.
#[derive(Debug, Clone)]
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn list(&self) -> Result<Vec<Note>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, content, created_at FROM notes ORDER BY created_at DESC, id DESC",
        )
            .fetch_all(&self.pool)
            .await
    }

    async fn get(&self, id: i64) -> Result<Option<Note>, sqlx::Error> {
        sqlx::query_as("SELECT id, content, created_at FROM notes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create(&self, content: &str) -> Result<Note, sqlx::Error> {
        sqlx::query_as("INSERT INTO notes (content) VALUES ($1) RETURNING id, content, created_at")
            .bind(content)
            .fetch_one(&self.pool)
            .await
    }

    async fn update(&self, id: i64, content: &str) -> Result<Option<Note>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE notes SET content = $1 WHERE id = $2 RETURNING id, content, created_at",
        )
        .bind(content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
