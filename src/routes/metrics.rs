//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

fn register_metrics() {
    metrics::describe_counter!(
        "duckgate_requests_total",
        "Total number of chat requests processed"
    );
    metrics::describe_histogram!(
        "duckgate_request_duration_seconds",
        "Time until the response started, in seconds"
    );
    metrics::describe_counter!(
        "duckgate_upstream_errors_total",
        "Failed calls to DuckDuckGo, by kind"
    );
    metrics::describe_counter!(
        "duckgate_stream_fragments_total",
        "Message fragments relayed from DuckDuckGo"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a request
pub fn record_request(status: &str, model: &str, duration_secs: f64) {
    metrics::counter!("duckgate_requests_total", "status" => status.to_string(), "model" => model.to_string())
        .increment(1);
    metrics::histogram!("duckgate_request_duration_seconds", "model" => model.to_string())
        .record(duration_secs);
}

/// Record a failed upstream call
pub fn record_upstream_error(kind: &str) {
    metrics::counter!("duckgate_upstream_errors_total", "kind" => kind.to_string()).increment(1);
}

/// Record fragments relayed for one response
pub fn record_stream_fragments(model: &str, count: u64) {
    metrics::counter!("duckgate_stream_fragments_total", "model" => model.to_string())
        .increment(count);
}
