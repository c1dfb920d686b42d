//! StoreClient port - Store account settings (phone number).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::PlatformError;
use crate::domain::session::SessionCredentials;

/// Phone status of the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneStatus {
    pub has_phone: bool,
    /// Last digits of the registered number, when one exists.
    pub last_digits: Option<String>,
}

/// Store site capability.
#[async_trait]
pub trait StoreClient: Send + Sync {
    fn set_cookies(&self, credentials: &SessionCredentials);

    /// Adds a phone number, bypassing the confirmation prompt for numbers
    /// already in use by another account.
    async fn add_phone_number(&self, number: &str) -> Result<(), PlatformError>;

    /// Confirms the number added by `add_phone_number` with the SMS code.
    async fn verify_phone_number(&self, code: &str) -> Result<(), PlatformError>;

    async fn has_phone(&self) -> Result<PhoneStatus, PlatformError>;
}
