//! Application layer - The bot and its session orchestration.
//!
//! - `bot` - The `Bot` aggregate: identity, settings, session state
//! - `session_manager` - Login, session start and session end
//! - `capabilities` - Gated platform operations
//! - `event_bridge` - Re-emits platform client events on the bot
//! - `pending` - Completion handles returned by gated operations

mod bot;
mod capabilities;
mod errors;
mod event_bridge;
mod pending;
mod session_manager;

pub use bot::{Bot, BotDeps};
pub use errors::BotError;
pub use event_bridge::{community_events, trade_events, ChattingWith, EventBridge, EventMap, Transform};
pub use pending::{channel, Completion, Pending};
