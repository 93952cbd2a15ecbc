//! Stream lifecycle and metrics subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming stream
//!     → record.rs (StreamRecord::open → registry.on_stream_opened)
//!     → handler runs (possibly suspended on the deferred timer)
//!     → exactly one terminal transition:
//!         Completed → registry.on_stream_closed_normally
//!         Reset     → registry.on_stream_reset
//!         Errored   → registry.on_stream_errored
//!
//! GET /metrics
//!     → registry.snapshot() (+ memory.rs for process memory)
//! ```
//!
//! # Design Decisions
//! - One mutex guards all counters so cross-field invariants hold
//! - A record left `Open` when dropped counts as a reset; the transport
//!   drops the handler future when the peer cancels the stream
//! - Decrements saturate; pairing opens with terminals is the caller's job

pub mod memory;
pub mod record;
pub mod registry;

pub use memory::MemoryUsage;
pub use record::{StreamRecord, StreamState};
pub use registry::{Snapshot, StreamRegistry};
