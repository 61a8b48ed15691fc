use axum::{
    extract::{Multipart, State},
    response::Json,
    Extension,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::object_key;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Location")]
    pub location: String,
    pub original_name: String,
    pub size: usize,
    pub content_type: String,
}

/// POST /files/upload - store one multipart `file` part under the caller's
/// namespace
pub async fn file_upload(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart payload: {}", e)))?
            .to_vec();

        upload = Some((original_name, content_type, bytes));
        break;
    }

    let (original_name, content_type, bytes) =
        upload.ok_or_else(|| ApiError::bad_request("No file was uploaded"))?;

    let key = object_key(auth.id, &original_name);
    let size = bytes.len();

    state
        .storage
        .put(&key, bytes, &content_type, &original_name)
        .await?;

    let location = state.storage.public_url(&key);

    Ok(Json(UploadResponse {
        key,
        location,
        original_name,
        size,
        content_type,
    }))
}
