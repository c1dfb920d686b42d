//! Event adapters.
//!
//! - `EventEmitter` - Synchronous, in-process named observer list

mod emitter;

pub use emitter::EventEmitter;
