//! Connection lifecycle tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Feed connection open/close events into the stream registry

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::streams::StreamRegistry;

/// Global atomic counter for connection IDs.
/// Relaxed ordering is enough, IDs only need to be unique.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Guard that counts one connection in the registry for its lifetime.
#[derive(Debug)]
pub struct ConnectionGuard {
    registry: Arc<StreamRegistry>,
    id: ConnectionId,
}

impl ConnectionGuard {
    /// Record a new connection. The count drops again when the guard does.
    pub fn track(registry: Arc<StreamRegistry>) -> Self {
        let id = ConnectionId::new();
        let connections = registry.on_connection_opened();
        tracing::info!(connection_id = %id, connections, "New session");
        Self { registry, id }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let connections = self.registry.on_connection_closed();
        tracing::info!(connection_id = %self.id, connections, "Session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
        assert!(id2.as_u64() > id1.as_u64());
    }

    #[test]
    fn guards_balance_connection_count() {
        let registry = Arc::new(StreamRegistry::new());

        let guard1 = ConnectionGuard::track(Arc::clone(&registry));
        let guard2 = ConnectionGuard::track(Arc::clone(&registry));
        assert_eq!(registry.snapshot().connections_count, 2);
        assert_ne!(guard1.id(), guard2.id());

        drop(guard1);
        assert_eq!(registry.snapshot().connections_count, 1);

        drop(guard2);
        assert_eq!(registry.snapshot().connections_count, 0);
    }
}
