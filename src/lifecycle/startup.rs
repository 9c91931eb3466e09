//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server from validated configuration
//! - Bind the listener
//! - Start the interrupt watcher
//! - Run until shutdown completes
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned, never retried
//! - Listener binds last (traffic only when ready)
//! - Never exits the process; the binary decides the exit status

use crate::config::ServerConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, LifecycleState, Shutdown};
use crate::net::Listener;

/// Run the server until an interrupt has been handled.
pub async fn launch(config: ServerConfig) -> Result<(), ServerError> {
    tracing::info!("Server is starting...");

    let server = HttpServer::new(config);
    let lifecycle = server.lifecycle();

    let listener = match Listener::bind(&server.config().listener).await {
        Ok(listener) => listener,
        Err(e) => {
            if let Err(err) = lifecycle.advance(LifecycleState::Stopped) {
                tracing::warn!(error = %err, "Unexpected lifecycle state");
            }
            return Err(e.into());
        }
    };

    let shutdown = Shutdown::new();
    let watcher = signals::spawn_interrupt_watcher(shutdown.clone());

    let result = server.run(listener, shutdown).await;
    watcher.abort();

    if result.is_ok() {
        tracing::info!("Server stopped");
    }
    result
}
