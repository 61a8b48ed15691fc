use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub email: String,
    pub confirmation_code: String,
}

/// POST /auth/confirm - confirm a freshly registered account
pub async fn confirm(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> ApiResult<Json<Value>> {
    state
        .identity
        .confirm(&payload.email, &payload.confirmation_code)
        .await?;

    Ok(Json(json!({
        "message": "Account confirmed. You can now log in.",
    })))
}
