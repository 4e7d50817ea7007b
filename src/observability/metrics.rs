//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define service metrics (requests, latency, gateway closes, task failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `api_requests_total` (counter): dispatched requests by method, status
//! - `api_request_duration_seconds` (histogram): latency distribution
//! - `gateway_active_connections` (gauge): live websocket connections
//! - `gateway_connections_closed_total` (counter): closes by reason
//! - `gateway_rate_violations_total` (counter): rate-limit closures
//! - `scheduler_task_failures_total` (counter): failed or panicked runs by task
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed, so tests and
//!   library users pay nothing
//! - Labels kept low-cardinality (no identities, no paths)

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install Prometheus exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "api_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("api_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn set_active_connections(count: usize) {
    gauge!("gateway_active_connections").set(count as f64);
}

pub fn record_connection_closed(reason: &'static str) {
    counter!("gateway_connections_closed_total", "reason" => reason).increment(1);
}

pub fn record_rate_violation() {
    counter!("gateway_rate_violations_total").increment(1);
}

pub fn record_task_failure(task: &str) {
    counter!("scheduler_task_failures_total", "task" => task.to_string()).increment(1);
}
