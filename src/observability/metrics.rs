//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, route
//! - `proxy_request_duration_seconds` (histogram): latency by route
//! - `resolver_lookups_total` (counter): cache hit / miss / unregistered / error
//! - `resolver_rpc_duration_seconds` (histogram): registry call latency
//! - `upstream_errors_total` (counter): failed upstream fetches by route

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Outcome of a domain resolution, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
    Unregistered,
    Error,
}

impl LookupOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            LookupOutcome::Hit => "hit",
            LookupOutcome::Miss => "miss",
            LookupOutcome::Unregistered => "unregistered",
            LookupOutcome::Error => "error",
        }
    }
}

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record a resolver lookup outcome.
pub fn record_lookup(outcome: LookupOutcome) {
    counter!("resolver_lookups_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record the duration of a registry RPC call.
pub fn record_rpc_duration(start: Instant) {
    histogram!("resolver_rpc_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a failed upstream fetch.
pub fn record_upstream_error(route: &'static str) {
    counter!("upstream_errors_total", "route" => route).increment(1);
}
