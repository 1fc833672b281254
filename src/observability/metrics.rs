//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): forward requests by method, status
//! - `relay_upstream_duration_seconds` (histogram): outbound call latency by method, outcome
//!
//! Recording is a no-op until a recorder is installed, so tests and
//! deployments without the scrape endpoint pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one handled forward request.
pub fn record_request(method: &str, status: u16) {
    counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the duration of one outbound call.
pub fn record_upstream(method: &str, start: Instant, ok: bool) {
    histogram!(
        "relay_upstream_duration_seconds",
        "method" => method.to_string(),
        "outcome" => if ok { "ok" } else { "error" }
    )
    .record(start.elapsed().as_secs_f64());
}
