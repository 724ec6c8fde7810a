//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, service
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_breaker_trips_total` (counter): breaker trips by service
//!
//! # Design Decisions
//! - Low-overhead updates; exporter runs on its own listener
//! - Service label uses the routing key, `none` when no service resolved

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
///
/// Failure to bind is logged and non-fatal: the gateway keeps serving
/// traffic without metrics exposition.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            metrics::describe_counter!(
                "gateway_requests_total",
                "Total requests handled, by method, status and service"
            );
            metrics::describe_histogram!(
                "gateway_request_duration_seconds",
                "Request latency in seconds"
            );
            metrics::describe_counter!(
                "gateway_breaker_trips_total",
                "Circuit breaker trips, by service"
            );
            tracing::info!(address = %addr, "metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "failed to install metrics exporter");
        }
    }
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, service: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("service", service.to_string()),
    ];
    metrics::counter!("gateway_requests_total", &labels).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a circuit breaker trip.
pub fn record_breaker_trip(service: &str) {
    metrics::counter!("gateway_breaker_trips_total", "service" => service.to_string())
        .increment(1);
}
