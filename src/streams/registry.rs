//! Process-wide stream and connection counters.
//!
//! # Responsibilities
//! - Count open streams, total requests, resets and live connections
//! - Produce consistent snapshots for the `/metrics` endpoint
//! - Mirror counters into the Prometheus recorder (when installed)

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::observability::metrics;
use crate::streams::memory::MemoryUsage;

#[derive(Debug, Default)]
struct Counters {
    active_streams: u64,
    total_requests: u64,
    reset_streams: u64,
    connections_count: u64,
}

/// The single authoritative holder of stream and connection counters.
///
/// Every `on_stream_opened` must be paired with exactly one of
/// `on_stream_closed_normally`, `on_stream_reset` or `on_stream_errored`.
/// [`StreamRecord`](crate::streams::StreamRecord) enforces that pairing for
/// handlers; direct callers are on their own.
#[derive(Debug)]
pub struct StreamRegistry {
    counters: Mutex<Counters>,
    /// Wall-clock start, milliseconds since the Unix epoch.
    start_time_ms: u64,
    started: Instant,
}

/// Immutable copy of the registry, as served by `GET /metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub active_streams: u64,
    pub total_requests: u64,
    pub reset_streams: u64,
    pub connections_count: u64,
    /// Milliseconds since the Unix epoch.
    pub start_time: u64,
    pub memory_usage: MemoryUsage,
    /// Milliseconds since `start_time`.
    pub uptime: u64,
}

impl StreamRegistry {
    pub fn new() -> Self {
        let start_time_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            counters: Mutex::new(Counters::default()),
            start_time_ms,
            started: Instant::now(),
        }
    }

    /// A stream was dispatched to a tracked route.
    pub fn on_stream_opened(&self) -> u64 {
        let mut c = self.lock();
        c.active_streams += 1;
        c.total_requests += 1;
        metrics::record_stream_opened(c.active_streams);
        c.active_streams
    }

    /// A stream produced its response and closed.
    pub fn on_stream_closed_normally(&self) {
        let mut c = self.lock();
        c.active_streams = c.active_streams.saturating_sub(1);
        metrics::record_active_streams(c.active_streams);
    }

    /// A stream was cancelled by the peer before its response was produced.
    /// Returns the new reset total.
    pub fn on_stream_reset(&self) -> u64 {
        let mut c = self.lock();
        c.active_streams = c.active_streams.saturating_sub(1);
        c.reset_streams += 1;
        metrics::record_stream_reset(c.active_streams);
        c.reset_streams
    }

    /// A stream failed for a reason other than peer cancellation.
    pub fn on_stream_errored(&self) {
        let mut c = self.lock();
        c.active_streams = c.active_streams.saturating_sub(1);
        metrics::record_active_streams(c.active_streams);
    }

    /// Returns the new connection count.
    pub fn on_connection_opened(&self) -> u64 {
        let mut c = self.lock();
        c.connections_count += 1;
        metrics::record_connections(c.connections_count);
        c.connections_count
    }

    /// Returns the new connection count.
    pub fn on_connection_closed(&self) -> u64 {
        let mut c = self.lock();
        c.connections_count = c.connections_count.saturating_sub(1);
        metrics::record_connections(c.connections_count);
        c.connections_count
    }

    /// Copy all counters under one lock acquisition.
    pub fn snapshot(&self) -> Snapshot {
        let (active_streams, total_requests, reset_streams, connections_count) = {
            let c = self.lock();
            (
                c.active_streams,
                c.total_requests,
                c.reset_streams,
                c.connections_count,
            )
        };

        Snapshot {
            active_streams,
            total_requests,
            reset_streams,
            connections_count,
            start_time: self.start_time_ms,
            memory_usage: MemoryUsage::current(),
            uptime: self.started.elapsed().as_millis() as u64,
        }
    }

    pub fn active_streams(&self) -> u64 {
        self.lock().active_streams
    }

    // A poisoned lock still holds valid integers; keep counting.
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}
