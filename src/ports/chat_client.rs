//! ChatClient port - Web chat presence.
//!
//! Chat messages themselves arrive through the community client's event
//! source; this port only starts and stops the polling session.

use async_trait::async_trait;
use std::time::Duration;

use super::PlatformError;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Starts web chat, polling for messages every `poll_interval`.
    async fn log_in(&self, poll_interval: Duration) -> Result<(), PlatformError>;

    /// Stops web chat. Safe when not logged in.
    async fn log_out(&self);
}
