//! HTTP/2 Rapid Reset demo client.
//!
//! Runs three phases against the demo server, each on its own connection:
//! a few normal `/metrics` requests, the rapid reset attack on `/slow`,
//! and a final `/metrics` read to show the impact.

use clap::Parser;
use std::path::PathBuf;

use rapid_reset::client::run_demo;
use rapid_reset::config::{load_client_config, validate_client_config, ClientConfig, ConfigError};
use rapid_reset::observability::logging;

#[derive(Parser)]
#[command(name = "rapid-reset-client")]
#[command(about = "Drive a rapid reset demo against the rapid-reset server", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server URL (https:// for TLS, http:// for cleartext HTTP/2).
    #[arg(short, long)]
    target: Option<String>,

    /// Baseline /metrics requests before the attack.
    #[arg(long)]
    normal_requests: Option<u32>,

    /// Streams to open and cancel.
    #[arg(long)]
    reset_count: Option<u32>,

    /// Milliseconds between opening successive streams.
    #[arg(long)]
    inter_request_delay_ms: Option<u64>,

    /// Milliseconds between opening a stream and cancelling it.
    #[arg(long)]
    reset_delay_ms: Option<u64>,

    /// Milliseconds to pause between phases.
    #[arg(long)]
    phase_pause_ms: Option<u64>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ClientConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_client_config(path)?,
            None => ClientConfig::default(),
        };

        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(n) = self.normal_requests {
            config.demo.normal_requests = n;
        }
        if let Some(n) = self.reset_count {
            config.attack.reset_count = n;
        }
        if let Some(ms) = self.inter_request_delay_ms {
            config.attack.inter_request_delay_ms = ms;
        }
        if let Some(ms) = self.reset_delay_ms {
            config.attack.reset_delay_ms = ms;
        }
        if let Some(ms) = self.phase_pause_ms {
            config.demo.phase_pause_ms = ms;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_client_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;
    logging::init(&logging::directive_for(&config.observability.log_level));

    tracing::info!(target_url = %config.target, "HTTP/2 Rapid Reset demo");
    let outcome = run_demo(&config).await?;

    match outcome.report {
        Ok(report) => {
            println!("\n{}", report);
            if let Ok(attack) = outcome.attack {
                println!("   • Streams issued by client: {}", attack.issued);
                println!("   • Streams reset by client: {}", attack.cancelled);
            }
            println!("\nDemo completed successfully!");
            println!("\nEDUCATIONAL CONCLUSIONS:");
            println!("• Rapid Reset exploits HTTP/2 asymmetry");
            println!("• Client can quickly reset streams");
            println!("• Server must maintain state for each stream");
            println!("• This can lead to server resource exhaustion");
            println!("• Defense: rate limiting, monitoring, timeouts");
        }
        Err(e) => {
            eprintln!("\nError during demonstration: {}", e);
            eprintln!("\nTroubleshooting:");
            eprintln!("1. Check if server is running: rapid-reset-server");
            eprintln!("2. Check if the port in {} is available", config.target);
            eprintln!("3. Check if certificate.pem and key.pem exist next to the server");
            eprintln!("4. Try running the server with --plaintext and an http:// target");
            if e.is_connection_refused() {
                eprintln!("\nProblem: server not responding at {}", config.target);
                eprintln!("   Run the server in a separate terminal before running the client");
            }
        }
    }

    Ok(())
}
