use std::sync::Arc;

use anyhow::Context;
use aws_config::{BehaviorVersion, Region};
use serde_json::json;
use tracing::info;

use scribe_api::app::app;
use scribe_api::config::config;
use scribe_api::database::manager;
use scribe_api::database::postgres::{PgNoteStore, PgUserStore};
use scribe_api::services::identity::CognitoIdentityProvider;
use scribe_api::services::storage::S3ObjectStorage;
use scribe_api::services::telemetry::{
    CloudWatchTelemetry, LogEvent, LogLevel, MetricUnit, Telemetry,
};
use scribe_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AWS_* and friends.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = config();
    info!(
        "Starting {} in {:?} mode",
        config.telemetry.app_name, config.environment
    );

    let pool = manager::connect().await.context("database pool")?;
    manager::ensure_schema(&pool).await.context("schema setup")?;

    let mut aws = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = config.aws.region.clone() {
        aws = aws.region(Region::new(region));
    }
    let aws = aws.load().await;

    let client_id = config
        .aws
        .cognito_client_id
        .clone()
        .context("COGNITO_CLIENT_ID is not set")?;
    let bucket = config
        .aws
        .bucket
        .clone()
        .context("AWS_BUCKET_NAME is not set")?;
    let region = aws
        .region()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "us-east-1".to_string());

    let identity = CognitoIdentityProvider::new(
        aws_sdk_cognitoidentityprovider::Client::new(&aws),
        client_id,
    );
    let storage = S3ObjectStorage::new(aws_sdk_s3::Client::new(&aws), bucket, &region)
        .context("storage configuration")?;
    let telemetry: Arc<dyn Telemetry> = Arc::new(CloudWatchTelemetry::new(
        aws_sdk_cloudwatch::Client::new(&aws),
        aws_sdk_cloudwatchlogs::Client::new(&aws),
        &config.telemetry.app_name,
    ));

    telemetry.initialize().await;
    telemetry
        .emit_metric("ApplicationStart", 1.0, MetricUnit::Count, &[])
        .await;

    let state = AppState {
        users: Arc::new(PgUserStore::new(pool.clone())),
        notes: Arc::new(PgNoteStore::new(pool)),
        identity: Arc::new(identity),
        storage: Arc::new(storage),
        telemetry: telemetry.clone(),
    };

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(telemetry))
        .await
        .context("server")?;

    Ok(())
}

async fn shutdown_signal(telemetry: Arc<dyn Telemetry>) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Application shutting down");
    telemetry
        .emit_log(LogEvent {
            level: LogLevel::Info,
            message: "Application shutting down".into(),
            fields: json!({}),
        })
        .await;
}
