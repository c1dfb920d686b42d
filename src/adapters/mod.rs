//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the bot to external systems:
//! - `auth` - Authenticator implementations
//! - `events` - In-process event emitter
//! - `platform` - Community, trade, store and chat clients

pub mod auth;
pub mod events;
pub mod platform;

pub use events::EventEmitter;
