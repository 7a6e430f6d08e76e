use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::NoteStore;
use crate::models::Note;

/// In-memory NoteStore for tests and for running without a database.
#[derive(Clone, Debug, Default)]
pub struct MemoryNoteStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    notes: Vec<Note>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list(&self) -> Result<Vec<Note>, sqlx::Error> {
        let inner = self.inner.read().await;
        Ok(inner.notes.iter().rev().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Note>, sqlx::Error> {
        let inner = self.inner.read().await;
        Ok(inner.notes.iter().find(|n| n.id == id).cloned())
    }

    async fn create(&self, content: &str) -> Result<Note, sqlx::Error> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let note = Note {
            id: inner.next_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        inner.notes.push(note.clone());
        Ok(note)
    }

    async fn update(&self, id: i64, content: &str) -> Result<Option<Note>, sqlx::Error> {
        let mut inner = self.inner.write().await;
        Ok(inner.notes.iter_mut().find(|n| n.id == id).map(|note| {
            note.content = content.to_string();
            note.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<(), sqlx::Error> {
        self.inner.write().await.notes.retain(|n| n.id != id);
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}
