//! Bot settings
//!
//! Fixed-schema options that shape how the trade client is built, plus an
//! `extensions` map for ad-hoc keys set at runtime.

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::TradeManagerOptions;

/// Names of the fixed-schema settings, as seen through `get_setting`.
const FIXED_SETTINGS: &[&str] = &[
    "api_key",
    "trade_cancel_time_secs",
    "trade_pending_cancel_time_secs",
    "language",
    "trade_poll_interval_ms",
    "trade_cancel_offer_count",
    "trade_cancel_offer_count_min_age_secs",
    "cancel_trade_on_overflow",
];

/// Bot settings
#[derive(Debug, Clone, Deserialize)]
pub struct BotSettings {
    /// Web API key, if already known
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Sent offers older than this are cancelled (seconds)
    #[serde(default = "default_one_day")]
    pub trade_cancel_time_secs: u64,

    /// Offers pending confirmation longer than this are cancelled (seconds)
    #[serde(default = "default_one_day")]
    pub trade_pending_cancel_time_secs: u64,

    /// Item description language
    #[serde(default = "default_language")]
    pub language: String,

    /// Offer polling interval in milliseconds
    #[serde(default = "default_trade_poll_interval")]
    pub trade_poll_interval_ms: u64,

    /// Active sent offers allowed before the oldest are cancelled
    #[serde(default = "default_cancel_offer_count")]
    pub trade_cancel_offer_count: u32,

    /// Minimum offer age before it counts towards the limit (seconds)
    #[serde(default = "default_cancel_offer_count_min_age")]
    pub trade_cancel_offer_count_min_age_secs: u64,

    /// Cancel oldest offers when the limit is exceeded
    #[serde(default = "default_true")]
    pub cancel_trade_on_overflow: bool,

    /// Ad-hoc settings outside the fixed schema
    #[serde(default)]
    pub extensions: HashMap<String, JsonValue>,
}

impl BotSettings {
    pub fn trade_cancel_time(&self) -> Duration {
        Duration::from_secs(self.trade_cancel_time_secs)
    }

    pub fn trade_pending_cancel_time(&self) -> Duration {
        Duration::from_secs(self.trade_pending_cancel_time_secs)
    }

    pub fn trade_poll_interval(&self) -> Duration {
        Duration::from_millis(self.trade_poll_interval_ms)
    }

    pub fn trade_cancel_offer_count_min_age(&self) -> Duration {
        Duration::from_secs(self.trade_cancel_offer_count_min_age_secs)
    }

    /// Options for building a trade client from these settings.
    pub fn trade_manager_options(&self) -> TradeManagerOptions {
        TradeManagerOptions {
            cancel_time: self.trade_cancel_time(),
            pending_cancel_time: self.trade_pending_cancel_time(),
            cancel_offer_count: self.trade_cancel_offer_count,
            cancel_offer_count_min_age: self.trade_cancel_offer_count_min_age(),
            language: self.language.clone(),
            poll_interval: self.trade_poll_interval(),
            cancel_on_overflow: self.cancel_trade_on_overflow,
        }
    }

    /// Reads a setting by name.
    ///
    /// Fixed-schema names return their current value; `api_key` is never
    /// exposed and reads as whether a key is configured. Other names are
    /// looked up in `extensions`.
    pub fn get_setting(&self, name: &str) -> Option<JsonValue> {
        let fixed = match name {
            "api_key" => JsonValue::Bool(self.api_key.is_some()),
            "trade_cancel_time_secs" => self.trade_cancel_time_secs.into(),
            "trade_pending_cancel_time_secs" => self.trade_pending_cancel_time_secs.into(),
            "language" => self.language.clone().into(),
            "trade_poll_interval_ms" => self.trade_poll_interval_ms.into(),
            "trade_cancel_offer_count" => self.trade_cancel_offer_count.into(),
            "trade_cancel_offer_count_min_age_secs" => {
                self.trade_cancel_offer_count_min_age_secs.into()
            }
            "cancel_trade_on_overflow" => self.cancel_trade_on_overflow.into(),
            _ => return self.extensions.get(name).cloned(),
        };
        Some(fixed)
    }

    /// Stores an ad-hoc setting, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// `ReservedSetting` if `name` belongs to the fixed schema.
    pub fn set_setting(
        &mut self,
        name: impl Into<String>,
        value: JsonValue,
    ) -> Result<Option<JsonValue>, ValidationError> {
        let name = name.into();
        if FIXED_SETTINGS.contains(&name.as_str()) {
            return Err(ValidationError::ReservedSetting(name));
        }
        Ok(self.extensions.insert(name, value))
    }

    /// Removes an ad-hoc setting. Fixed-schema names are left alone.
    pub fn delete_setting(&mut self, name: &str) -> Option<JsonValue> {
        self.extensions.remove(name)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.language.trim().is_empty() {
            return Err(ValidationError::MissingRequired("BOT__LANGUAGE"));
        }
        if self.trade_poll_interval_ms < 1000 {
            return Err(ValidationError::PollIntervalTooShort { min_ms: 1000 });
        }
        if self.cancel_trade_on_overflow && self.trade_cancel_offer_count == 0 {
            return Err(ValidationError::InvalidOfferCount);
        }
        Ok(())
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            trade_cancel_time_secs: default_one_day(),
            trade_pending_cancel_time_secs: default_one_day(),
            language: default_language(),
            trade_poll_interval_ms: default_trade_poll_interval(),
            trade_cancel_offer_count: default_cancel_offer_count(),
            trade_cancel_offer_count_min_age_secs: default_cancel_offer_count_min_age(),
            cancel_trade_on_overflow: default_true(),
            extensions: HashMap::new(),
        }
    }
}

fn default_one_day() -> u64 {
    60 * 60 * 24
}

fn default_language() -> String {
    "en".to_string()
}

fn default_trade_poll_interval() -> u64 {
    5000
}

fn default_cancel_offer_count() -> u32 {
    30
}

fn default_cancel_offer_count_min_age() -> u64 {
    60 * 60
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bot_settings_defaults() {
        let settings = BotSettings::default();
        assert!(settings.api_key.is_none());
        assert_eq!(settings.trade_cancel_time(), Duration::from_secs(86_400));
        assert_eq!(settings.trade_pending_cancel_time(), Duration::from_secs(86_400));
        assert_eq!(settings.language, "en");
        assert_eq!(settings.trade_poll_interval(), Duration::from_millis(5000));
        assert_eq!(settings.trade_cancel_offer_count, 30);
        assert_eq!(settings.trade_cancel_offer_count_min_age(), Duration::from_secs(3600));
        assert!(settings.cancel_trade_on_overflow);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_trade_manager_options_follow_settings() {
        let settings = BotSettings {
            trade_poll_interval_ms: 10_000,
            language: "de".to_string(),
            cancel_trade_on_overflow: false,
            ..BotSettings::default()
        };

        let options = settings.trade_manager_options();

        assert_eq!(options.poll_interval, Duration::from_secs(10));
        assert_eq!(options.language, "de");
        assert!(!options.cancel_on_overflow);
        assert_eq!(options.cancel_offer_count, 30);
    }

    #[test]
    fn test_extension_settings_round_trip() {
        let mut settings = BotSettings::default();

        assert_eq!(settings.set_setting("greeting", json!("hi")), Ok(None));
        assert_eq!(settings.get_setting("greeting"), Some(json!("hi")));
        assert_eq!(
            settings.set_setting("greeting", json!("hello")),
            Ok(Some(json!("hi")))
        );
        assert_eq!(settings.delete_setting("greeting"), Some(json!("hello")));
        assert_eq!(settings.get_setting("greeting"), None);
    }

    #[test]
    fn test_fixed_settings_readable_but_reserved() {
        let mut settings = BotSettings::default();

        assert_eq!(settings.get_setting("language"), Some(json!("en")));
        assert_eq!(settings.get_setting("trade_cancel_offer_count"), Some(json!(30)));
        assert_eq!(settings.get_setting("api_key"), Some(json!(false)));
        assert_eq!(
            settings.set_setting("language", json!("fr")),
            Err(ValidationError::ReservedSetting("language".to_string()))
        );
        assert_eq!(settings.delete_setting("language"), None);
        assert_eq!(settings.language, "en");
    }

    #[test]
    fn test_api_key_never_exposed() {
        let settings = BotSettings {
            api_key: Some(SecretString::new("ABCDEF0123".to_string())),
            ..BotSettings::default()
        };
        assert_eq!(settings.get_setting("api_key"), Some(json!(true)));
        assert!(!format!("{:?}", settings).contains("ABCDEF0123"));
    }

    #[test]
    fn test_validation_rejects_fast_polling() {
        let settings = BotSettings {
            trade_poll_interval_ms: 200,
            ..BotSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ValidationError::PollIntervalTooShort { min_ms: 1000 })
        );
    }

    #[test]
    fn test_validation_rejects_zero_offer_count_with_overflow() {
        let settings = BotSettings {
            trade_cancel_offer_count: 0,
            ..BotSettings::default()
        };
        assert_eq!(settings.validate(), Err(ValidationError::InvalidOfferCount));

        let settings = BotSettings {
            trade_cancel_offer_count: 0,
            cancel_trade_on_overflow: false,
            ..BotSettings::default()
        };
        assert!(settings.validate().is_ok());
    }
}
