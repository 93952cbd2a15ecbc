//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (Prometheus mirrors of the stream registry)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - The stream registry stays authoritative; Prometheus only mirrors it
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
