//! Platform endpoint configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Platform endpoints and client timings
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Community site base URL
    #[serde(default = "default_community_base_url")]
    pub community_base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Web chat poll interval in milliseconds
    #[serde(default = "default_chat_poll_interval")]
    pub chat_poll_interval_ms: u64,

    /// Domain registered with the web API key
    #[serde(default = "default_web_api_key_domain")]
    pub web_api_key_domain: String,
}

impl PlatformConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn chat_poll_interval(&self) -> Duration {
        Duration::from_millis(self.chat_poll_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = self.community_base_url.as_str();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ValidationError::InvalidUrl("PLATFORM__COMMUNITY_BASE_URL"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.chat_poll_interval_ms < 100 {
            return Err(ValidationError::PollIntervalTooShort { min_ms: 100 });
        }
        if self.web_api_key_domain.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PLATFORM__WEB_API_KEY_DOMAIN"));
        }
        Ok(())
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            community_base_url: default_community_base_url(),
            request_timeout_secs: default_request_timeout(),
            chat_poll_interval_ms: default_chat_poll_interval(),
            web_api_key_domain: default_web_api_key_domain(),
        }
    }
}

fn default_community_base_url() -> String {
    "https://steamcommunity.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_chat_poll_interval() -> u64 {
    500
}

fn default_web_api_key_domain() -> String {
    "localhost".to_string()
}
