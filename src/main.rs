//! HTTP/2 Rapid Reset demo server.
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!   Client streams       │                    SERVER                     │
//!   ─────────────────────┼─▶ net::listener ─▶ net::tls ─▶ http::server   │
//!                        │        │                         │            │
//!                        │        ▼                         ▼            │
//!                        │  ConnectionGuard          Axum router         │
//!                        │        │           /slow  /metrics  /  404    │
//!                        │        │             │       │      │         │
//!                        │        ▼             ▼       ▼      ▼         │
//!                        │  ┌──────────────────────────────────────────┐ │
//!                        │  │      streams::StreamRegistry (counters)  │ │
//!                        │  └──────────────────────────────────────────┘ │
//!                        └───────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};

use rapid_reset::config::{load_server_config, validate_server_config, ConfigError, ServerConfig};
use rapid_reset::http::server::ServerError;
use rapid_reset::lifecycle::signals;
use rapid_reset::net::{tls, Listener};
use rapid_reset::observability::{logging, metrics};
use rapid_reset::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "rapid-reset-server")]
#[command(about = "HTTP/2 server that tracks stream lifecycles under rapid reset", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, e.g. 0.0.0.0:3000.
    #[arg(short, long)]
    bind: Option<String>,

    /// PEM certificate.
    #[arg(long)]
    cert: Option<String>,

    /// PEM private key.
    #[arg(long)]
    key: Option<String>,

    /// Serve cleartext HTTP/2 (prior knowledge) and HTTP/1.1 instead of TLS.
    #[arg(long)]
    plaintext: bool,

    /// Delay before /slow responds, in milliseconds.
    #[arg(long)]
    slow_delay_ms: Option<u64>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_server_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(cert) = self.cert {
            config.listener.tls.cert_path = cert;
        }
        if let Some(key) = self.key {
            config.listener.tls.key_path = key;
        }
        if self.plaintext {
            config.listener.tls.enabled = false;
        }
        if let Some(delay) = self.slow_delay_ms {
            config.stream.slow_delay_ms = delay;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_server_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init(&logging::directive_for(&config.observability.log_level));
    tracing::info!("rapid-reset-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::warn!("Educational demo - use locally only!");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start Prometheus exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let acceptor = if config.listener.tls.enabled {
        let acceptor = tls::load_acceptor(
            Path::new(&config.listener.tls.cert_path),
            Path::new(&config.listener.tls.key_path),
        )
        .await
        .map_err(ServerError::Tls)?;
        Some(acceptor)
    } else {
        None
    };

    let listener = Listener::bind(&config.listener).await?;
    let local_addr = listener.local_addr()?;
    let scheme = if acceptor.is_some() { "https" } else { "http" };
    tracing::info!("Running on {}://{}", scheme, local_addr);
    tracing::info!("Metrics available at /metrics");
    tracing::info!("Slow endpoint at /slow");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::trigger_on_ctrl_c(&signal_shutdown).await;
    });

    HttpServer::new(config)
        .run(listener, acceptor, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
