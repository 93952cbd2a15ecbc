//! Metrics reporter: one `/metrics` fetch, parsed and rendered.

use hyper::StatusCode;
use std::fmt;
use std::time::Duration;

use crate::client::error::ClientError;
use crate::client::transport::{fetch, StreamTransport};
use crate::client::METRICS_PATH;
use crate::streams::Snapshot;

/// Server counters as seen by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub status: StatusCode,
    pub snapshot: Snapshot,
}

impl MetricsReport {
    /// Fetch and parse the server's counters. Parse failures come back as
    /// `ClientError::Parse`.
    pub async fn fetch<T: StreamTransport>(
        transport: &mut T,
        request_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let response = fetch(transport, METRICS_PATH, request_timeout).await?;
        tracing::info!(status = %response.status, "Response status");

        if !response.status.is_success() {
            return Err(ClientError::Status(response.status));
        }
        Self::parse(response.status, &response.body)
    }

    pub fn parse(status: StatusCode, body: &[u8]) -> Result<Self, ClientError> {
        let snapshot = serde_json::from_slice(body)?;
        Ok(Self { status, snapshot })
    }

    pub fn memory_mb(&self) -> u64 {
        self.snapshot.memory_usage.rss_mb()
    }

    pub fn uptime_secs(&self) -> u64 {
        (self.snapshot.uptime as f64 / 1000.0).round() as u64
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Server metrics after attack:")?;
        writeln!(f, "   • Total requests: {}", self.snapshot.total_requests)?;
        writeln!(f, "   • Active streams: {}", self.snapshot.active_streams)?;
        writeln!(f, "   • Reset streams: {}", self.snapshot.reset_streams)?;
        writeln!(f, "   • Connections: {}", self.snapshot.connections_count)?;
        writeln!(f, "   • Memory RSS: {} MB", self.memory_mb())?;
        write!(f, "   • Uptime: {} seconds", self.uptime_secs())
    }
}
