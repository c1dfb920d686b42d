//! Event vocabulary shared by platform sources and the bot's own surface.
//!
//! - `EventId` - Unique identifier for an emitted event
//! - `SourceId` - Identity of one event source instance
//! - `PlatformEvent` - Named event with an opaque JSON payload
//! - `Listener` / `ListenerId` - Observer registration
//! - `names` - The fixed outward event names

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::Timestamp;

/// Unique identifier for events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a single event source instance.
///
/// Facades rebuilt after logout get new sources with new ids, which is how
/// the bridge tells a fresh source from one it is already attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(Uuid);

impl SourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named notification with an opaque payload.
///
/// Multi-argument notifications carry a JSON object, e.g. `offerChanged`
/// carries `{"offer": .., "old_state": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformEvent {
    pub event_id: EventId,
    pub name: String,
    pub payload: JsonValue,
    pub occurred_at: Timestamp,
}

impl PlatformEvent {
    /// Creates an event stamped with a fresh id and the current time.
    pub fn new(name: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            event_id: EventId::new(),
            name: name.into(),
            payload,
            occurred_at: Timestamp::now(),
        }
    }

    /// Same event under another name, everything else untouched.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Observer callback. Invoked synchronously in emission order.
pub type Listener = Arc<dyn Fn(&PlatformEvent) + Send + Sync>;

/// Outward event names.
pub mod names {
    pub const LOGGED_IN: &str = "loggedIn";
    pub const SESSION_EXPIRED: &str = "sessionExpired";
    pub const UPDATED_ACCOUNT_DETAILS: &str = "updatedAccountDetails";
    pub const CHAT_MESSAGE: &str = "chatMessage";
    pub const CHAT_TYPING: &str = "chatTyping";
    pub const CHAT_LOGGED_ON: &str = "chatLoggedOn";
    pub const CHAT_LOG_ON_FAILED: &str = "chatLogOnFailed";
    pub const NEW_OFFER: &str = "newOffer";
    pub const OFFER_CHANGED: &str = "offerChanged";
    pub const SENT_OFFER_CHANGED: &str = "sentOfferChanged";
    pub const RECEIVED_OFFER_CHANGED: &str = "receivedOfferChanged";
    pub const SENT_OFFER_CANCELED: &str = "sentOfferCanceled";
    pub const REAL_TIME_TRADE_CONFIRMATION_REQUIRED: &str = "realTimeTradeConfirmationRequired";
    pub const REAL_TIME_TRADE_COMPLETED: &str = "realTimeTradeCompleted";
    pub const OFFER_LIST: &str = "offerList";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renamed_keeps_id_payload_and_time() {
        let event = PlatformEvent::new(names::SENT_OFFER_CHANGED, json!({"offer": 7}));
        let renamed = event.renamed(names::OFFER_CHANGED);

        assert_eq!(renamed.name, "offerChanged");
        assert_eq!(renamed.event_id, event.event_id);
        assert_eq!(renamed.payload, event.payload);
        assert_eq!(renamed.occurred_at, event.occurred_at);
    }

    #[test]
    fn source_ids_are_unique() {
        assert_ne!(SourceId::new(), SourceId::new());
    }

    #[test]
    fn event_ids_are_unique() {
        assert_ne!(EventId::new(), EventId::new());
    }
}
