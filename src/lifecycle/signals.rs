//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for the interrupt signal (Ctrl+C / SIGINT)
//! - Translate it into a [`Shutdown`] trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Runs as its own task, independent of the accept loop
//! - Only the first interrupt starts a shutdown; later ones are logged

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Spawn the task that turns interrupts into a shutdown.
pub fn spawn_interrupt_watcher(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for the interrupt signal");
                return;
            }

            if shutdown.trigger() {
                tracing::info!("Server is shutting down...");
            } else {
                tracing::warn!("Shutdown already in progress");
            }
        }
    })
}
