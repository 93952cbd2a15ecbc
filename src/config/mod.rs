//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI flags override individual fields (in the binaries)
//!     → validation.rs (semantic checks)
//!     → ServerConfig / ClientConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults, so no config file is needed for the demo
//! - Client defaults reproduce the classic demo run (3 baseline requests,
//!   50 resets, 50 ms spacing, 50 ms cancel delay)
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_client_config, load_server_config, ConfigError};
pub use schema::{
    AttackConfig, ClientConfig, DemoConfig, ListenerConfig, ObservabilityConfig, ServerConfig,
    StreamConfig, TimeoutConfig, TlsConfig,
};
pub use validation::{validate_client_config, validate_server_config, ValidationError};
