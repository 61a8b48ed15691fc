use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::resolve_local_user;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - authenticate against the identity provider
///
/// Also provisions the local user row when this account has never hit the
/// API before, so a login is enough to make `/auth/profile` work.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let tokens = state
        .identity
        .login(&payload.email, &payload.password)
        .await
        .map_err(|_| ApiError::unauthorized("Invalid login credentials"))?;

    let profile = state
        .identity
        .resolve_token(&tokens.access_token)
        .await
        .map_err(|_| ApiError::unauthorized("Invalid login credentials"))?;

    let user = resolve_local_user(&state, &profile).await?;

    Ok(Json(json!({
        "message": "Logged in successfully",
        "tokens": {
            "idToken": tokens.id_token,
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
            "expiresIn": tokens.expires_in,
        },
        "user": {
            "id": user.id,
            "email": user.email,
            "firstName": user.first_name,
            "lastName": user.last_name,
        },
    })))
}
