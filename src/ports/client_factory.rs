//! ClientFactory port - Builds the set of platform clients for one session.
//!
//! Platform clients carry session state that cannot be reset in place, so
//! logging out throws the whole set away and asks the factory for a new one.

use std::fmt;
use std::sync::Arc;

use super::{ChatClient, CommunityClient, StoreClient, TradeClient, TradeManagerOptions};

/// One generation of platform clients.
#[derive(Clone)]
pub struct PlatformHandle {
    /// Increases by one each time the clients are rebuilt.
    pub generation: u64,
    pub community: Arc<dyn CommunityClient>,
    pub trade: Arc<dyn TradeClient>,
    pub store: Arc<dyn StoreClient>,
    pub chat: Arc<dyn ChatClient>,
}

impl fmt::Debug for PlatformHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformHandle")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Builds fresh platform clients.
///
/// Implementations must return clients whose event sources have not been
/// seen before; the bot relies on new source ids to re-attach its bridge.
pub trait ClientFactory: Send + Sync {
    fn build(&self, generation: u64, options: &TradeManagerOptions) -> PlatformHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_factory_is_object_safe() {
        fn _accepts_dyn(_: &dyn ClientFactory) {}
        fn _assert_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_send_sync::<dyn ClientFactory>();
        _assert_send_sync::<PlatformHandle>();
    }
}
