use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::user_prefix;

/// DELETE /files/:key - remove one object owned by the caller
///
/// The key arrives URL-encoded as a single path segment. Ownership is the
/// key prefix itself, checked before the object store is contacted at all.
pub async fn file_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(key): Path<String>,
) -> ApiResult<Json<Value>> {
    let prefix = user_prefix(auth.id);
    if !key.starts_with(&prefix) {
        return Err(ApiError::forbidden("Not allowed to delete this file"));
    }

    state.storage.delete(&key).await?;

    Ok(Json(json!({ "message": "File deleted" })))
}
