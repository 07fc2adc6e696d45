//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatch outcomes, `outcome` =
//!   `matched` | `not_found`
//! - `http_requests_total` (counter): served requests by method and status
//! - `dispatch_request_duration_seconds` (histogram): handler chain latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const DISPATCH_REQUESTS: &str = "dispatch_requests_total";
pub const HTTP_REQUESTS: &str = "http_requests_total";
pub const DISPATCH_DURATION: &str = "dispatch_request_duration_seconds";

/// Install the Prometheus recorder with its scrape listener on `addr`.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one dispatch decision.
pub fn record_dispatch(outcome: &'static str) {
    metrics::counter!(DISPATCH_REQUESTS, "outcome" => outcome).increment(1);
}

/// Record a served request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        HTTP_REQUESTS,
        "method" => method.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        DISPATCH_DURATION,
        "method" => method.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}
