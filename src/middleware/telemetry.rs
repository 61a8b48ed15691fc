use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use uuid::Uuid;

use crate::services::telemetry::{LogEvent, LogLevel, MetricUnit};
use crate::state::AppState;

/// Request telemetry middleware.
///
/// Emits a start and completion log line plus duration/count measurements
/// for every request. The sink ships asynchronously, so a degraded
/// collaborator costs nothing on the response path.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    state
        .telemetry
        .emit_log(LogEvent {
            level: LogLevel::Info,
            message: format!("Request started: {} {}", method, path),
            fields: json!({
                "requestId": request_id,
                "method": method,
                "url": path,
            }),
        })
        .await;

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as f64;

    let level = if status >= 400 {
        LogLevel::Error
    } else {
        LogLevel::Info
    };
    state
        .telemetry
        .emit_log(LogEvent {
            level,
            message: format!("Request completed: {} {}", method, path),
            fields: json!({
                "requestId": request_id,
                "method": method,
                "url": path,
                "statusCode": status,
                "duration": duration_ms,
            }),
        })
        .await;

    let dimensions = [
        ("Path", path.clone()),
        ("Method", method),
        ("StatusCode", status.to_string()),
    ];
    state
        .telemetry
        .emit_metric(
            "RequestDuration",
            duration_ms,
            MetricUnit::Milliseconds,
            &dimensions,
        )
        .await;
    state
        .telemetry
        .emit_metric("RequestCount", 1.0, MetricUnit::Count, &dimensions)
        .await;

    if status >= 500 {
        state
            .telemetry
            .emit_metric("ErrorCount", 1.0, MetricUnit::Count, &[("Path", path)])
            .await;
    }

    response
}
