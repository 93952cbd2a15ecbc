//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C, then broadcast shutdown.
pub async fn trigger_on_ctrl_c(shutdown: &Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl+C received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
    }
    shutdown.trigger();
}
