use axum::{extract::State, response::Json, Extension};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::user_prefix;

/// Upper bound on one listing, matching the object store's page size.
const LIST_PAGE_SIZE: i32 = 1000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub url: String,
}

/// GET /files - objects under the caller's namespace
pub async fn file_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<FileEntry>>> {
    let prefix = user_prefix(auth.id);
    let objects = state.storage.list(&prefix, LIST_PAGE_SIZE).await?;

    let files = objects
        .into_iter()
        .map(|object| {
            let url = state.storage.public_url(&object.key);
            FileEntry {
                key: object.key,
                size: object.size,
                last_modified: object.last_modified,
                url,
            }
        })
        .collect();

    Ok(Json(files))
}
