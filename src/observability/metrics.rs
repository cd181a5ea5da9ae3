//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_router_collection_builds_total` (counter): collection rebuilds
//! - `site_router_collection_build_seconds` (histogram): rebuild duration
//! - `site_router_collection_loads_total` (counter): compiled artifact loads
//! - `site_router_custom_url_outcomes_total` (counter): processor outcomes by `outcome`

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus recorder and its scrape listener.
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_collection_build(elapsed: Duration) {
    metrics::counter!("site_router_collection_builds_total").increment(1);
    metrics::histogram!("site_router_collection_build_seconds").record(elapsed.as_secs_f64());
}

pub fn record_collection_load() {
    metrics::counter!("site_router_collection_loads_total").increment(1);
}

pub fn record_custom_url_outcome(outcome: &'static str) {
    metrics::counter!("site_router_custom_url_outcomes_total", "outcome" => outcome).increment(1);
}
