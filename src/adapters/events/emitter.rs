//! In-process event emitter.
//!
//! Listeners are keyed by event name and invoked synchronously, in
//! registration order, on the emitting task. The listener list is cloned
//! before invocation so a listener may register or remove listeners
//! (including itself) without deadlocking.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::foundation::{Listener, ListenerId, PlatformEvent, SourceId};
use crate::ports::EventSource;

type ListenerTable = HashMap<String, Vec<(ListenerId, Listener)>>;

/// Named observer list.
///
/// # Example
///
/// ```ignore
/// let emitter = EventEmitter::new();
/// let id = emitter.on("newOffer", Arc::new(|event| println!("{}", event.payload)));
/// emitter.emit("newOffer", json!({"id": 42}));
/// emitter.off(id);
/// ```
pub struct EventEmitter {
    source_id: SourceId,
    listeners: Mutex<ListenerTable>,
    next_id: AtomicU64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            source_id: SourceId::new(),
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn table(&self) -> MutexGuard<'_, ListenerTable> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a listener for `event_name`.
    pub fn on(&self, event_name: &str, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.table()
            .entry(event_name.to_string())
            .or_default()
            .push((id, listener));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut table = self.table();
        let mut removed = false;
        table.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|(entry_id, _)| *entry_id != id);
            removed |= entries.len() != before;
            !entries.is_empty()
        });
        removed
    }

    /// Emits a new event with a fresh id and timestamp.
    pub fn emit(&self, event_name: &str, payload: JsonValue) -> usize {
        self.emit_event(&PlatformEvent::new(event_name, payload))
    }

    /// Delivers an existing event to every listener of its name.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit_event(&self, event: &PlatformEvent) -> usize {
        let listeners: Vec<Listener> = self
            .table()
            .get(&event.name)
            .map(|entries| entries.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();

        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    pub fn listener_count(&self, event_name: &str) -> usize {
        self.table().get(event_name).map_or(0, Vec::len)
    }

    /// Total listeners across all event names.
    pub fn total_listeners(&self) -> usize {
        self.table().values().map(Vec::len).sum()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for EventEmitter {
    fn source_id(&self) -> SourceId {
        self.source_id
    }

    fn subscribe(&self, event_name: &str, listener: Listener) -> ListenerId {
        self.on(event_name, listener)
    }

    fn unsubscribe(&self, listener: ListenerId) -> bool {
        self.off(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn collector() -> (Arc<Mutex<Vec<PlatformEvent>>>, Listener) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener: Listener = Arc::new(move |event: &PlatformEvent| {
            sink.lock().unwrap().push(event.clone());
        });
        (seen, listener)
    }

    #[test]
    fn emit_reaches_only_matching_listeners() {
        let emitter = EventEmitter::new();
        let (offers, on_offer) = collector();
        let (chats, on_chat) = collector();
        emitter.on("newOffer", on_offer);
        emitter.on("chatMessage", on_chat);

        let delivered = emitter.emit("newOffer", json!({"id": 42}));

        assert_eq!(delivered, 1);
        assert_eq!(offers.lock().unwrap().len(), 1);
        assert_eq!(offers.lock().unwrap()[0].payload, json!({"id": 42}));
        assert!(chats.lock().unwrap().is_empty());
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let emitter = EventEmitter::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for n in 0..3 {
            let order = order.clone();
            emitter.on("tick", Arc::new(move |_: &PlatformEvent| order.lock().unwrap().push(n)));
        }

        emitter.emit("tick", JsonValue::Null);

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn off_removes_listener_once() {
        let emitter = EventEmitter::new();
        let (seen, listener) = collector();
        let id = emitter.on("tick", listener);

        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        assert_eq!(emitter.emit("tick", JsonValue::Null), 0);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(emitter.total_listeners(), 0);
    }

    #[test]
    fn listener_may_register_during_emit() {
        let emitter = Arc::new(EventEmitter::new());
        let inner = emitter.clone();
        emitter.on(
            "tick",
            Arc::new(move |_: &PlatformEvent| {
                inner.on("tock", Arc::new(|_: &PlatformEvent| {}));
            }),
        );

        emitter.emit("tick", JsonValue::Null);

        assert_eq!(emitter.listener_count("tock"), 1);
    }

    #[test]
    fn each_emitter_has_its_own_source_id() {
        assert_ne!(EventEmitter::new().source_id(), EventEmitter::new().source_id());
    }
}
