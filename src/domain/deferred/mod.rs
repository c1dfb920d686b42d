//! Deferred operations.
//!
//! Operations requested before a session exists are captured here and
//! replayed, in issue order, once the session is established.

mod queue;

pub use queue::{DeferredOperation, DeferredQueue, DrainSummary, QueueName};
