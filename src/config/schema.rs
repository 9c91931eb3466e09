//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observability::{LogFormat, Verbosity};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Which guard sits in front of the handler, and its settings.
    pub guard: GuardConfig,

    /// Static file settings.
    pub static_files: StaticFilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// IP address to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to bind. 0 picks an ephemeral port.
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl ListenerConfig {
    /// Socket address to bind, if the host is a valid IP.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration for connections and shutdown.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to read request headers, in seconds.
    pub read_secs: u64,

    /// Time allowed to produce a response, in seconds.
    pub write_secs: u64,

    /// Time a keep-alive connection may sit without requests, in seconds.
    pub idle_secs: u64,

    /// Time in-flight requests get to finish once shutdown starts, in seconds.
    pub shutdown_secs: u64,
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }

    pub fn shutdown(&self) -> Duration {
        Duration::from_secs(self.shutdown_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 5,
            write_secs: 10,
            idle_secs: 15,
            shutdown_secs: 30,
        }
    }
}

/// Request guard policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GuardMode {
    /// Require username and password in headers or query parameters.
    #[default]
    Credentials,
    /// Reject URLs containing a forbidden substring.
    Filter,
    /// Let every request through.
    None,
}

/// Guard configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    pub mode: GuardMode,
    pub credentials: CredentialConfig,
    pub filter: FilterConfig,
}

/// Expected credentials and where to look for them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub username: String,
    pub password: String,

    /// Header carrying the username.
    pub username_header: String,

    /// Header carrying the password.
    pub password_header: String,

    /// Query parameter carrying the username.
    pub username_query: String,

    /// Query parameter carrying the password.
    pub password_query: String,

    /// Requests whose path contains this skip the check.
    pub bypass_substring: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            username: "user".to_string(),
            password: "pass".to_string(),
            username_header: "u".to_string(),
            password_header: "p".to_string(),
            username_query: "u".to_string(),
            password_query: "p".to_string(),
            bypass_substring: "favicon.ico".to_string(),
        }
    }
}

/// Content filter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// URLs containing this substring are rejected.
    pub forbidden: String,
}

impl FilterConfig {
    pub fn rejection_body(&self) -> String {
        format!("You will not find {} here!", self.forbidden)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            forbidden: "pron".to_string(),
        }
    }
}

/// Static file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory holding `favicon.ico`.
    pub public_dir: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public"),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Output verbosity (debug, info, warning, error).
    pub verbosity: Verbosity,

    /// Log line format.
    pub format: LogFormat,

    /// Colorize text output.
    pub ansi: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Debug,
            format: LogFormat::Text,
            ansi: true,
        }
    }
}
