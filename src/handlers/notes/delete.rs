use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::parse_note_id;

/// DELETE /notes/:id - remove a note owned by the caller
pub async fn note_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_note_id(&id)?;

    let deleted = state.notes.delete_for_user(id, auth.id).await?;
    if !deleted {
        return Err(ApiError::not_found("Note not found"));
    }

    Ok(Json(json!({ "message": "Note deleted" })))
}
