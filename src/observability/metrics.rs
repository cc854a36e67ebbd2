//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method, route kind, status
//! - `api_request_duration_seconds` (histogram): latency by route kind
//! - `storage_fetch_total` (counter): document fetches by outcome
//! - `aggregate_skipped_total` (counter): documents omitted from aggregates
//! - `subscriptions_total` (counter): signups by outcome
//!
//! Recording is a no-op until a recorder is installed, so unit tests and
//! library users pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "api_requests_total",
        "method" => method.to_string(),
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("api_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fetch(outcome: &'static str) {
    ::metrics::counter!("storage_fetch_total", "outcome" => outcome).increment(1);
}

pub fn record_aggregate_skip() {
    ::metrics::counter!("aggregate_skipped_total").increment(1);
}

pub fn record_subscription(outcome: &'static str) {
    ::metrics::counter!("subscriptions_total", "outcome" => outcome).increment(1);
}
