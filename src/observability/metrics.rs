//! Prometheus exposition of stream and connection counters.
//!
//! # Metrics
//! - `rapid_reset_streams_opened_total` (counter)
//! - `rapid_reset_streams_reset_total` (counter)
//! - `rapid_reset_active_streams` (gauge)
//! - `rapid_reset_connections` (gauge)

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Install the global recorder and its scrape listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

pub fn record_stream_opened(active_streams: u64) {
    counter!("rapid_reset_streams_opened_total").increment(1);
    gauge!("rapid_reset_active_streams").set(active_streams as f64);
}

pub fn record_stream_reset(active_streams: u64) {
    counter!("rapid_reset_streams_reset_total").increment(1);
    gauge!("rapid_reset_active_streams").set(active_streams as f64);
}

pub fn record_active_streams(active_streams: u64) {
    gauge!("rapid_reset_active_streams").set(active_streams as f64);
}

pub fn record_connections(connections: u64) {
    gauge!("rapid_reset_connections").set(connections as f64);
}
