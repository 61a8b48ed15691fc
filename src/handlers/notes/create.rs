use axum::{extract::State, http::StatusCode, response::Json, Extension};
use serde::Deserialize;

use crate::database::models::Note;
use crate::database::repository::NoteDraft;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// POST /notes - create a note owned by the caller
pub async fn note_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let title = payload.title.unwrap_or_default();
    let content = payload.content.unwrap_or_default();

    if title.is_empty() || content.is_empty() {
        return Err(ApiError::bad_request("Title and content are required"));
    }

    let note = state
        .notes
        .create(auth.id, NoteDraft { title, content })
        .await?;

    Ok((StatusCode::CREATED, Json(note)))
}
