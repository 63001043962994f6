//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Endpoint host must not be empty")]
    EmptyHost,

    #[error("Endpoint path must start with '/'")]
    InvalidPath,

    #[error("Invalid endpoint URL '{0}': {1}")]
    InvalidEndpointUrl(String, String),

    #[error("Invalid connect timeout")]
    InvalidTimeout,

    #[error("Reconnect base_ms must be positive and max_ms at least base_ms")]
    InvalidBackoff,

    #[error("Log row height must be greater than zero")]
    InvalidRowHeight,

    #[error("Log capacity must be greater than zero")]
    InvalidLogCapacity,
}
