//! Notes endpoints. Reads are public; writes need a session.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::auth::RequireUser;
use crate::error::AppError;
use crate::models::{Note, NoteInput};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
}

fn validated(input: &NoteInput) -> Result<&str, AppError> {
    if input.content.trim().is_empty() {
        return Err(AppError::bad_request("content is required"));
    }
    Ok(&input.content)
}

/// `GET /api/notes`
pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, AppError> {
    Ok(Json(state.notes.list().await?))
}

/// `GET /api/notes/{id}`
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Option<Note>>, AppError> {
    Ok(Json(state.notes.get(id).await?))
}

/// `POST /api/notes`
pub async fn create_note(
    State(state): State<AppState>,
    RequireUser(session): RequireUser,
    Json(input): Json<NoteInput>,
) -> Result<Json<Note>, AppError> {
    let note = state.notes.create(validated(&input)?).await?;
    info!(note_id = note.id, provider_id = %session.user.provider_id, "note created");
    Ok(Json(note))
}

/// `PUT /api/notes/{id}`
pub async fn update_note(
    State(state): State<AppState>,
    RequireUser(_session): RequireUser,
    Path(id): Path<i64>,
    Json(input): Json<NoteInput>,
) -> Result<Json<Option<Note>>, AppError> {
    Ok(Json(state.notes.update(id, validated(&input)?).await?))
}

/// `DELETE /api/notes/{id}`
pub async fn delete_note(
    State(state): State<AppState>,
    RequireUser(session): RequireUser,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, AppError> {
    state.notes.delete(id).await?;
    info!(note_id = id, provider_id = %session.user.provider_id, "note deleted");
    Ok(Json(Deleted { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content_rejected() {
        for content in ["", "   ", "\n\t"] {
            let input = NoteInput {
                content: content.to_string(),
            };
            let err = validated(&input).unwrap_err();
            assert_eq!(err.body.code, "BAD_REQUEST");
        }

        let input = NoteInput {
            content: "  keep surrounding space ".to_string(),
        };
        assert_eq!(validated(&input).unwrap(), "  keep surrounding space ");
    }
}
