//! Core error types for countkit-core.
//!
//! This module defines the error hierarchy using thiserror. None of these
//! errors escape a running widget: the drivers absorb them locally (a bad
//! configuration keeps a countdown idle, a failed poll is counted against
//! the counter's poll health). They surface only at construction and
//! configuration-loading boundaries.

use thiserror::Error;

/// Core error type for countkit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Data source errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Countdown lifecycle errors
    #[error("Countdown error: {0}")]
    Countdown(#[from] CountdownError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Errors produced by a counter data source.
///
/// Every variant counts as one failed poll.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Endpoint could not be turned into a request URL
    #[error("Invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Endpoint responded with HTTP {0}")]
    Status(u16),

    /// Body was present but not a number
    #[error("Value for '{property}' is not numeric: {found}")]
    NotNumeric { property: String, found: String },

    /// Source-specific failure (mock sources, custom transports)
    #[error("{0}")]
    Unavailable(String),
}

/// Countdown lifecycle errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CountdownError {
    /// No valid configuration; the countdown stays idle
    #[error("Countdown is not configured: {0}")]
    NotConfigured(String),

    /// The countdown reached zero and cannot be restarted
    #[error("Countdown has already ended")]
    AlreadyEnded,
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
