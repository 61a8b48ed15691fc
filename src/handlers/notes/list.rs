use axum::{extract::State, response::Json, Extension};

use crate::database::models::Note;
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /notes - all notes owned by the caller
pub async fn note_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Note>>> {
    let notes = state.notes.list_for_user(auth.id).await?;
    Ok(Json(notes))
}
