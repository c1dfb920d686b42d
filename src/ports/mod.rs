//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the bot and the platform. Adapters implement these ports.
//!
//! ## Session Ports
//!
//! - `Authenticator` - Credential and two-factor exchange
//! - `ClientFactory` - Builds one generation of platform clients
//!
//! ## Capability Ports
//!
//! - `CommunityClient` - Profile and group management
//! - `CommunityActions` - Stateless form actions (votes, follows, invites)
//! - `TradeClient` - Trade offers and inventories
//! - `StoreClient` - Phone number management
//! - `ChatClient` - Web chat presence
//!
//! ## Event Ports
//!
//! - `EventSource` - Named notifications from a platform client

mod authenticator;
mod chat_client;
mod client_factory;
mod community_actions;
mod community_client;
mod event_source;
mod platform_error;
mod store_client;
mod trade_client;

pub use authenticator::Authenticator;
pub use chat_client::ChatClient;
pub use client_factory::{ClientFactory, PlatformHandle};
pub use community_actions::{CommunityActions, ProfileTarget, Vote};
pub use community_client::{CommunityClient, GroupInfo, ProfileEdit};
pub use event_source::EventSource;
pub use platform_error::PlatformError;
pub use store_client::{PhoneStatus, StoreClient};
pub use trade_client::{Inventory, TradeClient, TradeManagerOptions};
