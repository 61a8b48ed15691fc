use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::database::models::User;
use crate::database::repository::{NewUser, StoreError};
use crate::error::ApiError;
use crate::services::identity::AccountProfile;
use crate::state::AppState;

/// Authenticated caller context attached to the request after token
/// resolution.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub external_id: Option<String>,
}

/// Bearer-token authentication middleware.
///
/// Every request re-validates its token against the identity collaborator;
/// nothing is cached locally. A valid token whose account has never been
/// seen before provisions a local user row on the spot.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let profile = state
        .identity
        .resolve_token(&token)
        .await
        .map_err(|_| ApiError::forbidden("Token invalid or expired"))?;

    let user = resolve_local_user(&state, &profile).await?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        external_id: user.external_id,
    });

    Ok(next.run(request).await)
}

/// Find the local row for a resolved account, creating it on first sight.
///
/// Concurrent first requests can race to insert; the e-mail uniqueness
/// constraint picks the winner and the loser falls back to the winner's row.
pub async fn resolve_local_user(
    state: &AppState,
    profile: &AccountProfile,
) -> Result<User, ApiError> {
    if let Some(user) = state.users.find_by_email(&profile.email).await? {
        return Ok(user);
    }

    let new_user = NewUser {
        external_id: Some(profile.external_id.clone()),
        email: profile.email.clone(),
        first_name: profile.given_name.clone().filter(|s| !s.is_empty()),
        last_name: profile.family_name.clone().filter(|s| !s.is_empty()),
    };

    match state.users.create(new_user).await {
        Ok(user) => Ok(user),
        Err(StoreError::UniqueViolation(_)) => state
            .users
            .find_by_email(&profile.email)
            .await?
            .ok_or_else(|| ApiError::internal_server_error("User provisioning failed")),
        Err(err) => Err(err.into()),
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing authentication token".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Missing authentication token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
