//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, connection limit > 0)
//! - Check that header names and the bind host parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderName;

use crate::config::schema::{GuardMode, ServerConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("listener.max_connections must be greater than zero")]
    ZeroMaxConnections,

    #[error("listener.host {0:?} is not an IP address")]
    InvalidHost(String),

    #[error("guard.credentials.{field} {value:?} is not a valid header name")]
    InvalidHeaderName { field: &'static str, value: String },

    #[error("guard.credentials.{0} must not be empty")]
    EmptyCredentialField(&'static str),

    #[error("guard.filter.forbidden must not be empty")]
    EmptyForbidden,
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let timeouts = &config.timeouts;
    for (name, secs) in [
        ("read_secs", timeouts.read_secs),
        ("write_secs", timeouts.write_secs),
        ("idle_secs", timeouts.idle_secs),
        ("shutdown_secs", timeouts.shutdown_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }
    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::InvalidHost(config.listener.host.clone()));
    }

    match config.guard.mode {
        GuardMode::Credentials => {
            let creds = &config.guard.credentials;
            for (field, value) in [
                ("username_header", &creds.username_header),
                ("password_header", &creds.password_header),
            ] {
                if HeaderName::from_bytes(value.as_bytes()).is_err() {
                    errors.push(ValidationError::InvalidHeaderName {
                        field,
                        value: value.clone(),
                    });
                }
            }
            for (field, value) in [
                ("username", &creds.username),
                ("password", &creds.password),
                ("username_query", &creds.username_query),
                ("password_query", &creds.password_query),
                ("bypass_substring", &creds.bypass_substring),
            ] {
                if value.is_empty() {
                    errors.push(ValidationError::EmptyCredentialField(field));
                }
            }
        }
        GuardMode::Filter => {
            if config.guard.filter.forbidden.is_empty() {
                errors.push(ValidationError::EmptyForbidden);
            }
        }
        GuardMode::None => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ServerConfig::default();
        config.timeouts.read_secs = 0;
        config.timeouts.shutdown_secs = 0;
        config.listener.max_connections = 0;
        config.listener.host = "not-an-ip".to_string();
        config.guard.credentials.password_header = "bad header".to_string();
        config.guard.credentials.username = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroTimeout("read_secs"),
                ValidationError::ZeroTimeout("shutdown_secs"),
                ValidationError::ZeroMaxConnections,
                ValidationError::InvalidHost("not-an-ip".to_string()),
                ValidationError::InvalidHeaderName {
                    field: "password_header",
                    value: "bad header".to_string(),
                },
                ValidationError::EmptyCredentialField("username"),
            ]
        );
    }

    #[test]
    fn credential_fields_ignored_outside_credential_mode() {
        let mut config = ServerConfig::default();
        config.guard.mode = GuardMode::None;
        config.guard.credentials.username_header = String::new();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn filter_needs_a_substring() {
        let mut config = ServerConfig::default();
        config.guard.mode = GuardMode::Filter;
        config.guard.filter.forbidden = String::new();
        assert_eq!(validate_config(&config), Err(vec![ValidationError::EmptyForbidden]));
    }
}
