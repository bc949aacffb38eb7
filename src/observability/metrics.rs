//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, target
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_rate_limited_total` (counter): requests rejected by quota
//! - `gateway_circuit_rejected_total` (counter): requests failed fast
//! - `gateway_upstream_failures_total` (counter): transport-level failures

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request, whatever its outcome.
pub fn record_request(method: &str, status: u16, target: &str, start_time: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "target" => target.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds")
        .record(start_time.elapsed().as_secs_f64());
}

/// Record a request rejected by the rate limiter.
pub fn record_rate_limited() {
    metrics::counter!("gateway_rate_limited_total").increment(1);
}

/// Record a request failed fast by an open circuit.
pub fn record_circuit_rejected(target: &str) {
    metrics::counter!(
        "gateway_circuit_rejected_total",
        "target" => target.to_string()
    )
    .increment(1);
}

/// Record a transport-level failure talking to a backend.
pub fn record_upstream_failure(target: &str) {
    metrics::counter!(
        "gateway_upstream_failures_total",
        "target" => target.to_string()
    )
    .increment(1);
}
