//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fitflow_requests_total` (counter): API requests by route, status
//! - `fitflow_request_duration_seconds` (histogram): latency by route
//! - `fitflow_upstream_retries_total` (counter): retried transient failures by status
//! - `fitflow_upstream_failures_total` (counter): give-ups by kind
//!   (terminal, exhausted, cancelled)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished API request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "fitflow_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("fitflow_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record a transient failure that is about to be retried.
pub fn record_retry(status: Option<u16>) {
    let status = status.map_or_else(|| "none".to_string(), |s| s.to_string());
    metrics::counter!("fitflow_upstream_retries_total", "status" => status).increment(1);
}

/// Record an invocation that ended in failure.
pub fn record_give_up(kind: &'static str) {
    metrics::counter!("fitflow_upstream_failures_total", "kind" => kind).increment(1);
}
