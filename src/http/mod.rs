//! HTTP request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! TLS / TCP connection
//!     → server.rs (hyper auto connection: HTTP/2 or HTTP/1.1)
//!     → Axum router, one handler future per stream
//!         GET /slow    → slow.rs (StreamRecord + deferred timer)
//!         GET /metrics → handlers.rs (registry snapshot)
//!         GET /        → handlers.rs (usage text)
//!         otherwise    → 404, untracked
//! ```
//!
//! # Design Decisions
//! - Stream cancellation is observed as the handler future being dropped;
//!   the StreamRecord turns that into a registry reset
//! - 404s never touch the registry

pub mod handlers;
pub mod server;
pub mod slow;

pub use server::{AppState, HttpServer};
