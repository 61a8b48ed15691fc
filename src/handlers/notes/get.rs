use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};

use crate::database::models::Note;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::parse_note_id;

/// GET /notes/:id - one note, 404 when missing or owned by someone else
pub async fn note_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    let id = parse_note_id(&id)?;

    let note = state
        .notes
        .find_for_user(id, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;

    Ok(Json(note))
}
