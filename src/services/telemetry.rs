use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};
use aws_sdk_cloudwatchlogs::types::InputLogEvent;

/// Severity attached to a shipped log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

/// One structured log line bound for the telemetry collaborator.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    /// Extra structured payload merged into the shipped JSON line.
    pub fields: Value,
}

#[derive(Debug, Clone, Copy)]
pub enum MetricUnit {
    Milliseconds,
    Count,
}

impl From<MetricUnit> for StandardUnit {
    fn from(unit: MetricUnit) -> Self {
        match unit {
            MetricUnit::Milliseconds => StandardUnit::Milliseconds,
            MetricUnit::Count => StandardUnit::Count,
        }
    }
}

/// Telemetry sink. Every method is best-effort by contract: failures are
/// reported locally and never propagate to the request path.
#[async_trait]
pub trait Telemetry: Send + Sync {
    /// One-time provisioning of the sink (log group and stream).
    async fn initialize(&self);

    async fn emit_log(&self, event: LogEvent);

    async fn emit_metric(&self, name: &str, value: f64, unit: MetricUnit, dimensions: &[(&str, String)]);
}

/// Render the JSON line shipped for a log event.
pub fn render_log_line(event: &LogEvent) -> String {
    let mut body = serde_json::Map::new();
    body.insert("timestamp".into(), json!(Utc::now().to_rfc3339()));
    body.insert("level".into(), json!(event.level.as_str()));
    body.insert("message".into(), json!(event.message));
    if let Value::Object(extra) = &event.fields {
        body.extend(extra.clone());
    }
    Value::Object(body).to_string()
}

/// CloudWatch implementation: metrics under `<app>/metrics`, log lines into
/// `/aws/app/<app>` with a per-day stream. Shipment happens on a spawned
/// task so a slow or unreachable sink never delays a response.
pub struct CloudWatchTelemetry {
    metrics: aws_sdk_cloudwatch::Client,
    logs: aws_sdk_cloudwatchlogs::Client,
    namespace: String,
    log_group: String,
    log_stream: String,
}

impl CloudWatchTelemetry {
    pub fn new(
        metrics: aws_sdk_cloudwatch::Client,
        logs: aws_sdk_cloudwatchlogs::Client,
        app_name: &str,
    ) -> Self {
        Self {
            metrics,
            logs,
            namespace: format!("{}/metrics", app_name),
            log_group: format!("/aws/app/{}", app_name),
            log_stream: format!("{}-logs-{}", app_name, Utc::now().format("%Y-%m-%d")),
        }
    }
}

#[async_trait]
impl Telemetry for CloudWatchTelemetry {
    async fn initialize(&self) {
        if let Err(err) = self
            .logs
            .create_log_group()
            .log_group_name(&self.log_group)
            .send()
            .await
        {
            let already_exists = err
                .as_service_error()
                .map(|e| e.is_resource_already_exists_exception())
                .unwrap_or(false);
            if !already_exists {
                warn!("failed to create log group {}: {}", self.log_group, err);
            }
        }

        if let Err(err) = self
            .logs
            .create_log_stream()
            .log_group_name(&self.log_group)
            .log_stream_name(&self.log_stream)
            .send()
            .await
        {
            let already_exists = err
                .as_service_error()
                .map(|e| e.is_resource_already_exists_exception())
                .unwrap_or(false);
            if !already_exists {
                warn!("failed to create log stream {}: {}", self.log_stream, err);
            }
        }
    }

    async fn emit_log(&self, event: LogEvent) {
        let log_event = match InputLogEvent::builder()
            .timestamp(Utc::now().timestamp_millis())
            .message(render_log_line(&event))
            .build()
        {
            Ok(log_event) => log_event,
            Err(err) => {
                warn!("failed to build log event: {}", err);
                return;
            }
        };

        let request = self
            .logs
            .put_log_events()
            .log_group_name(&self.log_group)
            .log_stream_name(&self.log_stream)
            .log_events(log_event);

        tokio::spawn(async move {
            if let Err(err) = request.send().await {
                warn!("failed to ship log event: {}", err);
            }
        });
    }

    async fn emit_metric(
        &self,
        name: &str,
        value: f64,
        unit: MetricUnit,
        dimensions: &[(&str, String)],
    ) {
        let dims: Vec<Dimension> = dimensions
            .iter()
            .map(|(dim_name, dim_value)| {
                Dimension::builder()
                    .name(*dim_name)
                    .value(dim_value.clone())
                    .build()
            })
            .collect();

        let datum = MetricDatum::builder()
            .metric_name(name)
            .set_dimensions(Some(dims))
            .unit(unit.into())
            .value(value)
            .timestamp(aws_sdk_cloudwatch::primitives::DateTime::from(
                std::time::SystemTime::now(),
            ))
            .build();

        let request = self
            .metrics
            .put_metric_data()
            .namespace(&self.namespace)
            .metric_data(datum);

        tokio::spawn(async move {
            if let Err(err) = request.send().await {
                warn!("failed to ship metric: {}", err);
            }
        });
    }
}
