//! Command-line flags.
//!
//! Every flag is optional and overrides the value from the config file (or the
//! built-in default). Flag names keep the camelCase spelling operators already
//! use, with kebab-case aliases.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{loader, ConfigError, GuardMode, ServerConfig};
use crate::observability::{LogFormat, Verbosity};

#[derive(Debug, Parser)]
#[command(name = "hello-server", version)]
#[command(about = "Hello World HTTP server with request logging and a credential guard", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port number
    #[arg(long)]
    pub port: Option<u16>,

    /// IP address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// What the username query param will be
    #[arg(long = "usernameQueryParam", alias = "username-query-param")]
    pub username_query_param: Option<String>,

    /// What the username header will be
    #[arg(long = "usernameHeadParam", alias = "username-head-param")]
    pub username_head_param: Option<String>,

    /// What the password query param will be
    #[arg(long = "passwordQueryParam", alias = "password-query-param")]
    pub password_query_param: Option<String>,

    /// What the password header will be
    #[arg(long = "passwordHeadParam", alias = "password-head-param")]
    pub password_head_param: Option<String>,

    /// Accepted values: debug, info, warning, error
    #[arg(long = "outputMode", alias = "output-mode")]
    pub output_mode: Option<Verbosity>,

    /// Guard placed in front of the handler
    #[arg(long, value_enum)]
    pub guard: Option<GuardMode>,

    /// Substring rejected by the content filter
    #[arg(long)]
    pub forbidden: Option<String>,

    /// Directory holding favicon.ico
    #[arg(long = "public-dir")]
    pub public_dir: Option<PathBuf>,

    /// Log line format
    #[arg(long = "log-format", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Build the validated configuration: file (or defaults), then flags.
    pub fn load_config(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = loader::read_config(self.config.as_deref())?;
        self.apply(&mut config);
        loader::finalize(config)
    }

    fn apply(&self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = &self.host {
            config.listener.host = host.clone();
        }

        let creds = &mut config.guard.credentials;
        if let Some(key) = &self.username_query_param {
            creds.username_query = key.clone();
        }
        if let Some(header) = &self.username_head_param {
            creds.username_header = header.clone();
        }
        if let Some(key) = &self.password_query_param {
            creds.password_query = key.clone();
        }
        if let Some(header) = &self.password_head_param {
            creds.password_header = header.clone();
        }

        if let Some(mode) = self.guard {
            config.guard.mode = mode;
        }
        if let Some(forbidden) = &self.forbidden {
            config.guard.filter.forbidden = forbidden.clone();
        }
        if let Some(dir) = &self.public_dir {
            config.static_files.public_dir = dir.clone();
        }
        if let Some(verbosity) = self.output_mode {
            config.observability.verbosity = verbosity;
        }
        if let Some(format) = self.log_format {
            config.observability.format = format;
        }
    }
}
