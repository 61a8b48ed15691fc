use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::Deserialize;

use crate::database::models::Note;
use crate::database::repository::NoteChanges;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::parse_note_id;

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// PUT /notes/:id - partial update; omitted or empty fields keep their
/// stored value
pub async fn note_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateNoteRequest>,
) -> ApiResult<Json<Note>> {
    let id = parse_note_id(&id)?;

    let changes = NoteChanges {
        title: payload.title.filter(|s| !s.is_empty()),
        content: payload.content.filter(|s| !s.is_empty()),
    };

    let note = state
        .notes
        .update_for_user(id, auth.id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;

    Ok(Json(note))
}
