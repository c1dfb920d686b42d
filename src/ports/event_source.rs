//! EventSource port - Interface for observing platform notifications.
//!
//! Underlying platform clients (community chat, trade offer manager) emit
//! named notifications. The bot's event bridge subscribes through this port
//! without knowing how a client produces them.

use crate::domain::foundation::{Listener, ListenerId, SourceId};

/// A source of named platform events.
///
/// Implementations must:
/// - Invoke listeners in the order events are emitted
/// - Return a stable `source_id` for the lifetime of the instance
/// - Make `unsubscribe` idempotent (unknown ids return `false`)
pub trait EventSource: Send + Sync {
    /// Identity of this source instance.
    fn source_id(&self) -> SourceId;

    /// Registers `listener` for events named `event_name`.
    fn subscribe(&self, event_name: &str, listener: Listener) -> ListenerId;

    /// Removes a listener. Returns true if it was registered.
    fn unsubscribe(&self, listener: ListenerId) -> bool;
}
