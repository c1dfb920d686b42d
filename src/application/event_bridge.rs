//! Event bridge from platform clients to the bot's own event surface.
//!
//! # Event Flow
//!
//! ```text
//! Platform client emits "sentOfferChanged"
//!          │
//!          ▼
//! ┌─────────────────────┐
//! │ EventBridge listener│
//! │ (one per route)     │
//! └─────────────────────┘
//!          │  optional transform, then rename
//!          ▼
//! ┌─────────────────────┐
//! │ Bot EventEmitter    │──► "offerChanged"
//! │                     │──► "sentOfferChanged"
//! └─────────────────────┘
//! ```
//!
//! Attachments are keyed by `SourceId`, so attaching the same source twice
//! is a no-op while a freshly built client (new id) is attached anew.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::adapters::events::EventEmitter;
use crate::domain::foundation::{names, AccountId, ListenerId, PlatformEvent, SourceId};
use crate::ports::EventSource;

/// Reshapes a source event before it is re-emitted.
pub type Transform = Arc<dyn Fn(&PlatformEvent) -> PlatformEvent + Send + Sync>;

#[derive(Clone)]
struct Route {
    source_event: String,
    outward_event: String,
    transform: Option<Transform>,
}

/// Which source events to re-emit, and under what names.
///
/// # Example
///
/// ```ignore
/// let map = EventMap::new()
///     .forward("newOffer")
///     .rename("sentOfferChanged", "offerChanged")
///     .forward("sentOfferChanged");
/// ```
#[derive(Clone, Default)]
pub struct EventMap {
    routes: Vec<Route>,
}

impl EventMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-emits `event` under its own name.
    pub fn forward(self, event: &str) -> Self {
        self.rename(event, event)
    }

    /// Re-emits `source_event` as `outward_event`.
    pub fn rename(mut self, source_event: &str, outward_event: &str) -> Self {
        self.routes.push(Route {
            source_event: source_event.to_string(),
            outward_event: outward_event.to_string(),
            transform: None,
        });
        self
    }

    /// Re-emits `source_event` as `outward_event` after `transform`.
    pub fn transform<F>(mut self, source_event: &str, outward_event: &str, transform: F) -> Self
    where
        F: Fn(&PlatformEvent) -> PlatformEvent + Send + Sync + 'static,
    {
        self.routes.push(Route {
            source_event: source_event.to_string(),
            outward_event: outward_event.to_string(),
            transform: Some(Arc::new(transform)),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

struct Attachment {
    source: Arc<dyn EventSource>,
    listeners: Vec<ListenerId>,
}

/// Subscribes to platform clients and re-emits on one target emitter.
pub struct EventBridge {
    target: Arc<EventEmitter>,
    attachments: Mutex<HashMap<SourceId, Attachment>>,
}

impl EventBridge {
    pub fn new(target: Arc<EventEmitter>) -> Self {
        Self {
            target,
            attachments: Mutex::new(HashMap::new()),
        }
    }

    fn attachments(&self) -> MutexGuard<'_, HashMap<SourceId, Attachment>> {
        self.attachments.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribes every route of `map` on `source`.
    ///
    /// Returns false, doing nothing, if `source` is already attached.
    pub fn attach(&self, source: Arc<dyn EventSource>, map: &EventMap) -> bool {
        let source_id = source.source_id();
        let mut attachments = self.attachments();
        if attachments.contains_key(&source_id) {
            tracing::debug!(?source_id, "Event source already attached");
            return false;
        }

        let listeners = map
            .routes
            .iter()
            .map(|route| {
                let target = self.target.clone();
                let outward = route.outward_event.clone();
                let transform = route.transform.clone();
                source.subscribe(
                    &route.source_event,
                    Arc::new(move |event: &PlatformEvent| {
                        let outgoing = match &transform {
                            Some(transform) => transform(event).renamed(outward.as_str()),
                            None => event.renamed(outward.as_str()),
                        };
                        target.emit_event(&outgoing);
                    }),
                )
            })
            .collect::<Vec<_>>();

        tracing::debug!(?source_id, routes = listeners.len(), "Event source attached");
        attachments.insert(source_id, Attachment { source, listeners });
        true
    }

    /// Removes every listener this bridge placed on `source_id`.
    pub fn detach(&self, source_id: SourceId) -> bool {
        let Some(attachment) = self.attachments().remove(&source_id) else {
            return false;
        };
        for listener in attachment.listeners {
            attachment.source.unsubscribe(listener);
        }
        true
    }

    /// Removes every attachment. Returns how many sources were detached.
    pub fn detach_all(&self) -> usize {
        let attachments: Vec<Attachment> = self.attachments().drain().map(|(_, a)| a).collect();
        for attachment in &attachments {
            for listener in &attachment.listeners {
                attachment.source.unsubscribe(*listener);
            }
        }
        attachments.len()
    }

    pub fn is_attached(&self, source_id: SourceId) -> bool {
        self.attachments().contains_key(&source_id)
    }

    pub fn attached_count(&self) -> usize {
        self.attachments().len()
    }
}

/// The account the operator is currently chatting with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChattingWith {
    pub username: String,
    pub account: AccountId,
}

/// Sender of a chat event, accepting either a string or numeric id64.
fn chat_sender(payload: &JsonValue) -> Option<AccountId> {
    match payload.get("sender")? {
        JsonValue::String(s) => s.parse().ok(),
        JsonValue::Number(n) => n.as_u64().and_then(|id| AccountId::from_id64(id).ok()),
        _ => None,
    }
}

/// Routes for the community client.
///
/// Chat messages from the current chat partner are logged as they pass.
pub fn community_events(chatting: Arc<RwLock<Option<ChattingWith>>>) -> EventMap {
    EventMap::new()
        .forward(names::CHAT_TYPING)
        .forward(names::CHAT_LOGGED_ON)
        .forward(names::CHAT_LOG_ON_FAILED)
        .transform(names::CHAT_MESSAGE, names::CHAT_MESSAGE, move |event| {
            let partner = chatting
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if let Some(partner) = partner {
                if chat_sender(&event.payload) == Some(partner.account) {
                    let message = event
                        .payload
                        .get("message")
                        .and_then(JsonValue::as_str)
                        .unwrap_or_default();
                    tracing::info!(from = %partner.username, "{}", message);
                }
            }
            event.clone()
        })
        .transform(names::SESSION_EXPIRED, names::SESSION_EXPIRED, |event| {
            tracing::debug!(reason = %event.payload, "Login session expired");
            event.clone()
        })
}

/// Routes for the trade client.
///
/// `sentOfferChanged` is emitted twice: as the general `offerChanged` and
/// under its own name.
pub fn trade_events() -> EventMap {
    EventMap::new()
        .rename(names::SENT_OFFER_CHANGED, names::OFFER_CHANGED)
        .forward(names::RECEIVED_OFFER_CHANGED)
        .forward(names::OFFER_LIST)
        .forward(names::NEW_OFFER)
        .forward(names::SENT_OFFER_CHANGED)
        .forward(names::REAL_TIME_TRADE_CONFIRMATION_REQUIRED)
        .forward(names::REAL_TIME_TRADE_COMPLETED)
        .forward(names::SENT_OFFER_CANCELED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(target: &EventEmitter, name: &str) -> Arc<Mutex<Vec<PlatformEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        target.on(
            name,
            Arc::new(move |event: &PlatformEvent| sink.lock().unwrap().push(event.clone())),
        );
        seen
    }

    fn bridge() -> (Arc<EventEmitter>, EventBridge) {
        let target = Arc::new(EventEmitter::new());
        (target.clone(), EventBridge::new(target))
    }

    #[test]
    fn forwarded_event_passes_through_unchanged() {
        let (target, bridge) = bridge();
        let source = Arc::new(EventEmitter::new());
        let seen = record(&target, "newOffer");
        bridge.attach(source.clone(), &trade_events());

        let original = PlatformEvent::new("newOffer", json!({"id": 42}));
        source.emit_event(&original);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], original);
    }

    #[test]
    fn sent_offer_changed_fans_out_to_two_names() {
        let (target, bridge) = bridge();
        let source = Arc::new(EventEmitter::new());
        let changed = record(&target, "offerChanged");
        let sent = record(&target, "sentOfferChanged");
        bridge.attach(source.clone(), &trade_events());

        source.emit("sentOfferChanged", json!({"offer": {"id": 1}, "old_state": 2}));

        assert_eq!(changed.lock().unwrap().len(), 1);
        assert_eq!(sent.lock().unwrap().len(), 1);
        assert_eq!(
            changed.lock().unwrap()[0].payload,
            json!({"offer": {"id": 1}, "old_state": 2})
        );
    }

    #[test]
    fn attach_is_idempotent_per_source() {
        let (target, bridge) = bridge();
        let source = Arc::new(EventEmitter::new());
        let seen = record(&target, "newOffer");

        assert!(bridge.attach(source.clone(), &trade_events()));
        assert!(!bridge.attach(source.clone(), &trade_events()));
        source.emit("newOffer", json!({"id": 1}));

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(source.total_listeners(), trade_events().len());
    }

    #[test]
    fn detach_all_silences_sources() {
        let (target, bridge) = bridge();
        let community = Arc::new(EventEmitter::new());
        let trade = Arc::new(EventEmitter::new());
        let seen = record(&target, "chatTyping");
        bridge.attach(community.clone(), &community_events(Arc::default()));
        bridge.attach(trade.clone(), &trade_events());

        assert_eq!(bridge.detach_all(), 2);
        community.emit("chatTyping", json!({"sender": "76561197960287930"}));

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(community.total_listeners(), 0);
        assert_eq!(trade.total_listeners(), 0);
        assert!(!bridge.is_attached(community.source_id()));
    }

    #[test]
    fn detach_single_source() {
        let (_target, bridge) = bridge();
        let source = Arc::new(EventEmitter::new());
        bridge.attach(source.clone(), &trade_events());

        assert!(bridge.detach(source.source_id()));
        assert!(!bridge.detach(source.source_id()));
        assert_eq!(bridge.attached_count(), 0);
    }

    #[test]
    fn transform_reshapes_payload() {
        let (target, bridge) = bridge();
        let source = Arc::new(EventEmitter::new());
        let seen = record(&target, "offerCount");
        let map = EventMap::new().transform("tradeOffers", "offerCount", |event| {
            PlatformEvent {
                payload: json!({"count": event.payload["offers"].as_array().map_or(0, Vec::len)}),
                ..event.clone()
            }
        });
        bridge.attach(source.clone(), &map);

        source.emit("tradeOffers", json!({"offers": [1, 2, 3]}));

        assert_eq!(seen.lock().unwrap()[0].payload, json!({"count": 3}));
    }

    #[test]
    fn chat_messages_pass_through_whoever_the_sender() {
        let (target, bridge) = bridge();
        let source = Arc::new(EventEmitter::new());
        let seen = record(&target, "chatMessage");
        let chatting = Arc::new(RwLock::new(Some(ChattingWith {
            username: "alice".to_string(),
            account: AccountId::from_account_number(22202),
        })));
        bridge.attach(source.clone(), &community_events(chatting));

        source.emit("chatMessage", json!({"sender": "76561197960287930", "message": "hi"}));
        source.emit("chatMessage", json!({"sender": 76561197960287931u64, "message": "yo"}));

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn chat_sender_accepts_string_or_number() {
        let id = AccountId::from_account_number(22202);
        assert_eq!(chat_sender(&json!({"sender": "76561197960287930"})), Some(id));
        assert_eq!(chat_sender(&json!({"sender": 76561197960287930u64})), Some(id));
        assert_eq!(chat_sender(&json!({"sender": true})), None);
        assert_eq!(chat_sender(&json!({})), None);
    }
}
