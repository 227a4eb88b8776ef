//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_segments_emitted_total` (counter): emitted trace segments by kind
//! - `gateway_segment_emit_failures_total` (counter): dropped segments by transport
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Emit failures are always counted, even when warning logs are disabled

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "route" => route.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one successfully emitted trace segment.
pub fn record_segment_emitted(kind: &'static str) {
    counter!("gateway_segments_emitted_total", "kind" => kind).increment(1);
}

/// Record one dropped trace segment.
pub fn record_emit_failure(transport: &'static str) {
    counter!("gateway_segment_emit_failures_total", "transport" => transport).increment(1);
}
