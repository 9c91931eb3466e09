//! Hello World HTTP server.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────────────┐
//!                       │                      HELLO SERVER                         │
//!                       │                                                           │
//!   Client Request      │  ┌─────────┐   ┌─────────┐   ┌──────────┐   ┌─────────┐   │
//!   ────────────────────┼─▶│   net   │──▶│ logging │──▶│  guard   │──▶│ handler │   │
//!                       │  │listener │   │  (in)   │   │creds/filt│   │ hello   │   │
//!                       │  └─────────┘   └─────────┘   └────┬─────┘   └────┬────┘   │
//!                       │                                   │ 401/404      │ 200    │
//!   Client Response     │                ┌─────────┐        │              │        │
//!   ◀───────────────────┼────────────────│ logging │◀───────┴──────────────┘        │
//!                       │                │  (out)  │                                │
//!                       │                └─────────┘                                │
//!                       │  ┌─────────────────────────────────────────────────────┐  │
//!                       │  │  config (file + flags)   lifecycle (SIGINT → drain) │  │
//!                       │  │  observability (verbosity-gated tracing)            │  │
//!                       │  └─────────────────────────────────────────────────────┘  │
//!                       └──────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use clap::Parser;

use hello_server::cli::Cli;
use hello_server::lifecycle::startup;
use hello_server::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging is not up yet, so configuration problems go to stderr.
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("hello-server: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("hello-server: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        guard = ?config.guard.mode,
        verbosity = %config.observability.verbosity,
        "Configuration loaded"
    );

    match startup::launch(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server terminated");
            ExitCode::FAILURE
        }
    }
}
