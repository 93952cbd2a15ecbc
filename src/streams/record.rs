//! Per-stream lifecycle state machine.
//!
//! ```text
//!         ┌──────────── complete() ───────────▶ Completed
//!  Open ──┼──────────── fail() ───────────────▶ Errored
//!         └──── reset() / dropped while Open ─▶ Reset
//! ```
//!
//! Whichever transition arrives first wins; every later attempt is a no-op
//! and leaves the registry untouched.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::streams::registry::StreamRegistry;

/// Lifecycle state of a tracked stream.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Open = 0,
    Completed = 1,
    Reset = 2,
    Errored = 3,
}

impl From<u8> for StreamState {
    fn from(val: u8) -> Self {
        match val {
            1 => StreamState::Completed,
            2 => StreamState::Reset,
            3 => StreamState::Errored,
            _ => StreamState::Open,
        }
    }
}

/// Registry membership of one in-flight stream.
///
/// Creating a record counts the stream as opened. The record is the single
/// owner of the terminal decision: the first of `complete`, `reset`, `fail`
/// or `Drop` performs the registry update.
#[derive(Debug)]
pub struct StreamRecord {
    registry: Arc<StreamRegistry>,
    state: AtomicU8,
    active_at_open: u64,
}

impl StreamRecord {
    /// Register a new stream with the registry.
    pub fn open(registry: Arc<StreamRegistry>) -> Self {
        let active_at_open = registry.on_stream_opened();
        Self {
            registry,
            state: AtomicU8::new(StreamState::Open as u8),
            active_at_open,
        }
    }

    /// Active stream count right after this stream was registered.
    pub fn active_at_open(&self) -> u64 {
        self.active_at_open
    }

    pub fn state(&self) -> StreamState {
        self.state.load(Ordering::Acquire).into()
    }

    /// Response produced. Returns `false` if the stream was already resolved.
    pub fn complete(&self) -> bool {
        self.resolve(StreamState::Completed)
    }

    /// Peer cancelled the stream. Returns `false` if already resolved.
    pub fn reset(&self) -> bool {
        self.resolve(StreamState::Reset)
    }

    /// Stream failed locally. Returns `false` if already resolved.
    pub fn fail(&self) -> bool {
        self.resolve(StreamState::Errored)
    }

    fn resolve(&self, terminal: StreamState) -> bool {
        if self
            .state
            .compare_exchange(
                StreamState::Open as u8,
                terminal as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return false;
        }

        match terminal {
            StreamState::Completed => self.registry.on_stream_closed_normally(),
            StreamState::Reset => {
                let total = self.registry.on_stream_reset();
                tracing::debug!(reset_streams = total, "Stream reset");
            }
            StreamState::Errored => {
                self.registry.on_stream_errored();
                tracing::debug!("Stream errored");
            }
            StreamState::Open => unreachable!("Open is not a terminal state"),
        }
        true
    }
}

impl Drop for StreamRecord {
    fn drop(&mut self) {
        // Still open here means the handler future was torn down before it
        // produced a response: RST_STREAM from the peer or a dead connection.
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<StreamRegistry> {
        Arc::new(StreamRegistry::new())
    }

    #[test]
    fn open_registers_stream() {
        let registry = registry();
        let record = StreamRecord::open(Arc::clone(&registry));
        assert_eq!(record.state(), StreamState::Open);
        assert_eq!(record.active_at_open(), 1);
        assert_eq!(registry.active_streams(), 1);

        let second = StreamRecord::open(Arc::clone(&registry));
        assert_eq!(second.active_at_open(), 2);
    }

    #[test]
    fn complete_wins_over_later_reset() {
        let registry = registry();
        let record = StreamRecord::open(Arc::clone(&registry));

        assert!(record.complete());
        assert!(!record.reset());
        assert!(!record.fail());
        drop(record);

        let snap = registry.snapshot();
        assert_eq!(snap.active_streams, 0);
        assert_eq!(snap.reset_streams, 0);
    }

    #[test]
    fn drop_while_open_counts_as_reset() {
        let registry = registry();
        drop(StreamRecord::open(Arc::clone(&registry)));

        let snap = registry.snapshot();
        assert_eq!(snap.active_streams, 0);
        assert_eq!(snap.reset_streams, 1);
        assert_eq!(snap.total_requests, 1);
    }

    #[test]
    fn double_reset_counts_once() {
        let registry = registry();
        let record = StreamRecord::open(Arc::clone(&registry));
        assert!(record.reset());
        assert!(!record.reset());
        drop(record);

        assert_eq!(registry.snapshot().reset_streams, 1);
        assert_eq!(registry.active_streams(), 0);
    }

    #[test]
    fn failure_is_not_a_reset() {
        let registry = registry();
        let record = StreamRecord::open(Arc::clone(&registry));
        assert!(record.fail());
        assert_eq!(record.state(), StreamState::Errored);
        drop(record);

        let snap = registry.snapshot();
        assert_eq!(snap.active_streams, 0);
        assert_eq!(snap.reset_streams, 0);
    }

    #[test]
    fn racing_resolvers_resolve_once() {
        let registry = registry();
        let record = Arc::new(StreamRecord::open(Arc::clone(&registry)));

        let winners: usize = (0..4)
            .map(|i| {
                let record = Arc::clone(&record);
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        record.complete()
                    } else {
                        record.reset()
                    }
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();

        assert_eq!(winners, 1);
        drop(record);
        assert_eq!(registry.active_streams(), 0);
    }
}
