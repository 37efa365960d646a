//! Metrics collection and exposition.
//!
//! # Metrics
//! - `demo_requests_total` (counter): requests by endpoint and outcome
//! - `demo_request_duration_seconds` (histogram): latency by endpoint
//! - `demo_fallbacks_total` (counter): fallback responses by endpoint
//! - `demo_retries_total` (counter): retry attempts by policy
//! - `demo_circuit_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `demo_circuit_rejections_total` (counter): calls refused by an open circuit
//!
//! Without an installed recorder every call here is a no-op.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

/// Record a finished API request.
pub fn record_request(endpoint: &'static str, outcome: &'static str, start: Instant) {
    ::metrics::counter!("demo_requests_total", "endpoint" => endpoint, "outcome" => outcome)
        .increment(1);
    ::metrics::histogram!("demo_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fallback(endpoint: &'static str) {
    ::metrics::counter!("demo_fallbacks_total", "endpoint" => endpoint).increment(1);
}

pub fn record_retry(policy: &str) {
    ::metrics::counter!("demo_retries_total", "policy" => policy.to_string()).increment(1);
}

pub fn record_circuit_state(policy: &str, state: CircuitState) {
    ::metrics::gauge!("demo_circuit_state", "policy" => policy.to_string()).set(state.as_gauge());
}

pub fn record_circuit_rejection(policy: &str) {
    ::metrics::counter!("demo_circuit_rejections_total", "policy" => policy.to_string())
        .increment(1);
}
