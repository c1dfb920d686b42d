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
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Poll interval must be at least {min_ms}ms")]
    PollIntervalTooShort { min_ms: u64 },

    #[error("Offer overflow cancellation needs a positive offer count")]
    InvalidOfferCount,

    #[error("Setting '{0}' is part of the fixed schema and cannot be replaced")]
    ReservedSetting(String),
}
