//! Demo client subsystem.
//!
//! # Data Flow
//! ```text
//! demo.rs
//!     → baseline phase: H2Session → baseline.rs (sequential GET /metrics)
//!     → attack phase:   H2Session → attack.rs (open /slow, cancel later)
//!     → report phase:   H2Session → report.rs (GET /metrics, parse, render)
//!
//! Drivers only see transport.rs (open stream, cancel, await response);
//! h2.rs implements it over hyper's HTTP/2 client, tls.rs supplies TLS.
//! ```
//!
//! # Design Decisions
//! - Each phase owns its session and closes it on every exit path
//! - No retries: failed requests are logged and skipped
//! - Cancelling a finished stream is a no-op, never an error

pub mod attack;
pub mod baseline;
pub mod demo;
pub mod error;
pub mod h2;
pub mod report;
pub mod tls;
pub mod transport;

pub use attack::{AttackDriver, AttackSummary};
pub use baseline::{BaselineDriver, BaselineSummary};
pub use demo::{run_demo, DemoOutcome};
pub use error::ClientError;
pub use h2::{H2Session, Target};
pub use report::MetricsReport;
pub use transport::{InFlightStream, StreamResponse, StreamTransport};

/// Endpoint held open by the server until its deferred timer fires.
pub const SLOW_PATH: &str = "/slow";

/// Endpoint answering with the server's counters.
pub const METRICS_PATH: &str = "/metrics";
