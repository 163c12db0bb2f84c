//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, cache, probes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `casegate_requests_total` (counter): requests by rule, status
//! - `casegate_request_duration_seconds` (histogram): latency distribution
//! - `casegate_lookup_cache_total` (counter): case-id cache hits and misses
//! - `casegate_probes_total` (counter): data-store probes by outcome
//! - `casegate_fanout_duration_seconds` (histogram): time to settle a fan-out
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Labels stay low-cardinality (rule names, not paths or case ids)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(rule: &str, status: u16, start: Instant) {
    counter!("casegate_requests_total", "rule" => rule.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("casegate_request_duration_seconds", "rule" => rule.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("casegate_lookup_cache_total", "outcome" => outcome).increment(1);
}

pub fn record_probe(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("casegate_probes_total", "outcome" => outcome).increment(1);
}

pub fn record_fanout(elapsed: Duration) {
    histogram!("casegate_fanout_duration_seconds").record(elapsed.as_secs_f64());
}
