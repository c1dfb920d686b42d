//! Platform client adapters.
//!
//! - `http_community` - Community form actions over HTTP (reqwest)
//! - `mock` - Recording mocks for every capability port and the client factory

mod http_community;
mod mock;

pub use http_community::{interpret, interpret_invite, HttpCommunityActions, HttpCommunityConfig};
pub use mock::{
    MockChatClient, MockClientFactory, MockCommunityActions, MockCommunityClient, MockPlatform,
    MockStoreClient, MockTradeClient, RecordedCall,
};
