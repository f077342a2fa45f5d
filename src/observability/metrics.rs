//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lucid_cache_requests_total` (counter): cache lookups by outcome
//!   (hit, miss, error, skipped)
//! - `lucid_rate_limited_total` (counter): denied requests by reason
//!   (limit_exceeded, circuit_open)
//! - `lucid_circuit_transitions_total` (counter): breaker transitions by
//!   component and new state

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_cache_result(outcome: &'static str) {
    counter!("lucid_cache_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited(reason: &'static str) {
    counter!("lucid_rate_limited_total", "reason" => reason).increment(1);
}

pub fn record_circuit_transition(component: &'static str, state: &'static str) {
    counter!(
        "lucid_circuit_transitions_total",
        "component" => component,
        "state" => state
    )
    .increment(1);
}
