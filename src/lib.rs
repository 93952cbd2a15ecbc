//! HTTP/2 Rapid Reset testbed.
//!
//! A server that counts every stream it accepts and holds `/slow` streams
//! open behind a timer, plus a client that opens streams and cancels them
//! before the server answers. The counters at `/metrics` show what the
//! cancellations cost the server.

// Server
pub mod config;
pub mod http;
pub mod net;
pub mod streams;

// Client
pub mod client;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::{ClientConfig, ServerConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use streams::{Snapshot, StreamRegistry};
