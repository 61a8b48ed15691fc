use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub confirmation_code: String,
    pub new_password: String,
}

/// POST /auth/forgot-password - start the reset flow; the provider sends the
/// confirmation code out of band
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<Value>> {
    state.identity.forgot_password(&payload.email).await?;

    Ok(Json(json!({
        "message": "A password reset code has been sent to the given email address",
    })))
}

/// POST /auth/reset-password - complete the reset flow with the emailed code
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<Value>> {
    state
        .identity
        .reset_password(
            &payload.email,
            &payload.confirmation_code,
            &payload.new_password,
        )
        .await?;

    Ok(Json(json!({
        "message": "Password changed. You can now log in.",
    })))
}
