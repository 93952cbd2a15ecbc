//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for both binaries
//! - Seed the filter from config, let `RUST_LOG` override it

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `default_directive` applies when
/// `RUST_LOG` is unset, e.g. `"rapid_reset=info,tower_http=info"`.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Build the default directive for a log level like `"debug"`.
pub fn directive_for(level: &str) -> String {
    format!("rapid_reset={level},tower_http={level}")
}
