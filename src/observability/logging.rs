//! Structured logging.
//!
//! # Responsibilities
//! - Parse the output verbosity (debug, info, warning, error)
//! - Build the `tracing` subscriber for the configured verbosity and format
//! - Install it as the process-wide default
//!
//! # Design Decisions
//! - Verbosity is fixed at startup and is the only source of the filter
//! - JSON format for machine parsing, text format for terminals
//! - Each event is written as one line, so concurrent requests never interleave

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Targets whose output is gated by the verbosity.
const LOG_TARGETS: &[&str] = &["hello_server", "tower_http"];

/// Output verbosity, ordered from most to least chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Verbosity {
    #[default]
    Debug,
    Info,
    Warning,
    Error,
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Debug => "debug",
            Verbosity::Info => "info",
            Verbosity::Warning => "warning",
            Verbosity::Error => "error",
        }
    }

    /// The most verbose `tracing` level still emitted.
    pub fn max_level(&self) -> Level {
        match self {
            Verbosity::Debug => Level::DEBUG,
            Verbosity::Info => Level::INFO,
            Verbosity::Warning => Level::WARN,
            Verbosity::Error => Level::ERROR,
        }
    }

    /// `EnvFilter` directive limiting this crate and `tower_http` to the verbosity.
    pub fn directive(&self) -> String {
        let level = self.max_level().as_str().to_ascii_lowercase();
        LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown verbosity name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No valid output mode was defined: {0:?} (expected debug, info, warning or error)")]
pub struct ParseVerbosityError(pub String);

impl FromStr for Verbosity {
    type Err = ParseVerbosityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Verbosity::Debug),
            "info" => Ok(Verbosity::Info),
            "warning" => Ok(Verbosity::Warning),
            "error" => Ok(Verbosity::Error),
            _ => Err(ParseVerbosityError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Verbosity {
    type Error = ParseVerbosityError;

    fn try_from(value: String) -> Result<Self, ParseVerbosityError> {
        value.parse()
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Error installing the global subscriber.
#[derive(Debug, thiserror::Error)]
#[error("Failed to install log subscriber: {0}")]
pub struct LoggingError(#[from] tracing::subscriber::SetGlobalDefaultError);

/// Build a subscriber writing to `writer`, filtered by the configured verbosity.
pub fn subscriber<W>(config: &ObservabilityConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(EnvFilter::new(config.verbosity.directive()));

    match config.format {
        LogFormat::Text => Box::new(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(config.ansi)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Json => Box::new(
            registry.with(tracing_subscriber::fmt::layer().json().with_writer(writer)),
        ),
    }
}

/// Install the stdout subscriber as the global default.
pub fn init(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    tracing::subscriber::set_global_default(subscriber(config, std::io::stdout))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    /// In-memory log sink for assertions.
    #[derive(Clone, Default)]
    pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }

        pub fn lines(&self) -> Vec<String> {
            self.contents().lines().map(str::to_owned).collect()
        }
    }

    pub struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedWriter;

        fn make_writer(&'a self) -> Self::Writer {
            CapturedWriter(Arc::clone(&self.0))
        }
    }
}
