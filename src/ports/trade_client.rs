//! TradeClient port - Trade offer manager and inventories.
//!
//! The trade client polls offers, loads inventories, and emits offer
//! notifications (`newOffer`, `sentOfferChanged`, `offerList`...). Its
//! options are fixed at construction time from the bot settings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

use super::{EventSource, PlatformError};
use crate::domain::foundation::{AccountId, AppId, ContextId};
use crate::domain::session::SessionCredentials;

/// Construction options for a trade offer manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeManagerOptions {
    /// Sent offers older than this are cancelled.
    pub cancel_time: Duration,
    /// Offers awaiting confirmation longer than this are cancelled.
    pub pending_cancel_time: Duration,
    /// Active sent offers allowed before the oldest are cancelled.
    pub cancel_offer_count: u32,
    /// Minimum age before an offer counts towards `cancel_offer_count`.
    pub cancel_offer_count_min_age: Duration,
    /// Language for item descriptions.
    pub language: String,
    pub poll_interval: Duration,
    /// Whether overflow cancellation is wanted at all.
    pub cancel_on_overflow: bool,
}

/// Result of an inventory load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<JsonValue>,
    pub currencies: Vec<JsonValue>,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.currencies.is_empty()
    }
}

/// Trade offer capability.
///
/// # Contract
///
/// - `set_cookies` also probes for web API access; failure to obtain an
///   API key is returned as an error, with `AccessDenied` meaning the
///   account has no API access at all
/// - `set_api_access(false)` disables overflow auto-cancellation and
///   offer listing
#[async_trait]
pub trait TradeClient: Send + Sync {
    fn event_source(&self) -> Arc<dyn EventSource>;

    async fn set_cookies(&self, credentials: &SessionCredentials) -> Result<(), PlatformError>;

    fn set_api_access(&self, available: bool);

    async fn load_inventory(
        &self,
        app: AppId,
        context: ContextId,
        tradable_only: bool,
    ) -> Result<Inventory, PlatformError>;

    async fn load_user_inventory(
        &self,
        owner: AccountId,
        app: AppId,
        context: ContextId,
        tradable_only: bool,
    ) -> Result<Inventory, PlatformError>;
}
