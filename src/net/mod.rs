//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → tls.rs (optional TLS handshake, ALPN h2 / http/1.1)
//!     → connection.rs (registry guard: onConnectionOpened / Closed)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents unbounded connection growth
//! - The connection guard is created once the TLS handshake succeeds; a
//!   socket that never completes it is not a session
//! - TLS is optional and handled transparently

pub mod connection;
pub mod listener;
pub mod tls;

pub use connection::{ConnectionGuard, ConnectionId};
pub use listener::{ConnectionPermit, Listener, ListenerError};
