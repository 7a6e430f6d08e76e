//! A note row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating or updating a note.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    pub content: String,
}
