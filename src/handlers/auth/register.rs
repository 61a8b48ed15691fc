use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::repository::NewUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// POST /auth/register - create the account with the identity provider and
/// mirror the profile locally
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let (email, password) = match (&payload.email, &payload.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email.clone(), password.clone())
        }
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };

    let external_id = state
        .identity
        .register(
            &email,
            &password,
            payload.first_name.as_deref().unwrap_or(""),
            payload.last_name.as_deref().unwrap_or(""),
        )
        .await?;

    state
        .users
        .create(NewUser {
            external_id: Some(external_id.clone()),
            email,
            first_name: payload.first_name.filter(|s| !s.is_empty()),
            last_name: payload.last_name.filter(|s| !s.is_empty()),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered. Check your email to confirm the account.",
            "userId": external_id,
        })),
    ))
}
