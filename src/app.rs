use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{auth, files, notes};
use crate::middleware::{require_auth, track_requests};
use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/confirm", post(auth::confirm))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password));

    let protected = Router::new()
        .route("/auth/profile", get(auth::profile))
        .route("/notes", get(notes::note_list).post(notes::note_create))
        .route(
            "/notes/:id",
            get(notes::note_get)
                .put(notes::note_update)
                .delete(notes::note_delete),
        )
        .route("/files/upload", post(files::file_upload))
        .route("/files", get(files::file_list))
        .route("/files/:key", delete(files::file_delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Scribe API",
        "version": version,
        "description": "Notes and file storage REST API",
        "endpoints": {
            "auth": "/auth/register, /auth/confirm, /auth/login, /auth/forgot-password, /auth/reset-password (public)",
            "profile": "/auth/profile (bearer)",
            "notes": "/notes[/:id] (bearer)",
            "files": "/files, /files/upload, /files/:key (bearer)",
            "health": "/health (public)",
        },
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.users.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok",
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "databaseError": e.to_string(),
            })),
        ),
    }
}
