//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! (and optionally a file) using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `TRADEBOT` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use tradebot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Polling offers every {:?}", config.bot.trade_poll_interval());
//! ```

mod error;
mod logging;
mod platform;
mod settings;

pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use platform::PlatformConfig;
pub use settings::BotSettings;

use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "TRADEBOT";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Bot settings (trade manager options, ad-hoc extensions)
    #[serde(default)]
    pub bot: BotSettings,

    /// Platform endpoints and timings
    #[serde(default)]
    pub platform: PlatformConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TRADEBOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TRADEBOT__BOT__LANGUAGE=de` -> `bot.language = "de"`
    /// - `TRADEBOT__LOGGING__FORMAT=json` -> `logging.format = json`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a file, with environment variables on top.
    ///
    /// The format follows the file extension (`.toml`, `.json`, `.yaml`...).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or unreadable, or values
    /// cannot be parsed into expected types.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.bot.validate()?;
        self.platform.validate()?;
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}
