//! Configuration schema definitions.
//!
//! Both binaries deserialize their configuration from TOML. Every section
//! carries `#[serde(default)]`, so partial files are fine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Stream handling (deferred response delay).
    pub stream: StreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// TLS configuration. When disabled the server speaks cleartext
    /// (HTTP/1.1 or prior-knowledge HTTP/2).
    pub tls: TlsConfig,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tls: TlsConfig::default(),
            max_connections: 10_000,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    pub enabled: bool,

    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cert_path: "./certificate.pem".to_string(),
            key_path: "./key.pem".to_string(),
        }
    }
}

/// Per-stream behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamConfig {
    /// How long `/slow` holds a stream before responding, in milliseconds.
    pub slow_delay_ms: u64,
}

impl StreamConfig {
    pub fn slow_delay(&self) -> Duration {
        Duration::from_millis(self.slow_delay_ms)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            slow_delay_ms: 10_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Root configuration for the demo client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server URL, `https://` for TLS or `http://` for cleartext HTTP/2.
    pub target: String,

    pub demo: DemoConfig,

    pub attack: AttackConfig,

    pub timeouts: TimeoutConfig,

    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: "https://localhost:3000".to_string(),
            demo: DemoConfig::default(),
            attack: AttackConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Baseline phase and inter-phase pacing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of sequential `/metrics` requests in the baseline phase.
    pub normal_requests: u32,

    /// Pause between baseline requests, in milliseconds.
    pub baseline_pause_ms: u64,

    /// Pause between phases, in milliseconds.
    pub phase_pause_ms: u64,
}

impl DemoConfig {
    pub fn baseline_pause(&self) -> Duration {
        Duration::from_millis(self.baseline_pause_ms)
    }

    pub fn phase_pause(&self) -> Duration {
        Duration::from_millis(self.phase_pause_ms)
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            normal_requests: 3,
            baseline_pause_ms: 500,
            phase_pause_ms: 2_000,
        }
    }
}

/// Attack phase parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Number of streams to open and cancel.
    pub reset_count: u32,

    /// Spacing between opening successive streams, in milliseconds.
    pub inter_request_delay_ms: u64,

    /// Time between opening a stream and cancelling it, in milliseconds.
    pub reset_delay_ms: u64,
}

impl AttackConfig {
    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            reset_count: 50,
            inter_request_delay_ms: 50,
            reset_delay_ms: 50,
        }
    }
}

/// Client timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment (TCP + TLS + HTTP/2 handshake) in seconds.
    pub connect_secs: u64,

    /// Full request/response cycle for baseline and report requests, in seconds.
    pub request_secs: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}
