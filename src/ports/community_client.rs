//! CommunityClient port - Profile and group management on the community site.
//!
//! The community client owns the web session used for profile edits and
//! group membership. It is also an event source for chat notifications
//! (`chatMessage`, `chatTyping`, `sessionExpired`...).

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{EventSource, PlatformError};
use crate::domain::foundation::{AccountId, GroupId};
use crate::domain::session::SessionCredentials;

/// Profile fields to change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub custom_url: Option<String>,
}

impl ProfileEdit {
    /// Edit that only changes the persona name.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Summary of a community group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: GroupId,
    pub name: String,
    pub member_count: u32,
}

/// Community site capability.
///
/// # Contract
///
/// - `set_cookies` replaces the web session used by subsequent calls
/// - Calls made without cookies fail with `PlatformError::NotLoggedIn`
/// - `event_source` returns the same source for the lifetime of the client
#[async_trait]
pub trait CommunityClient: Send + Sync {
    fn event_source(&self) -> Arc<dyn EventSource>;

    fn set_cookies(&self, credentials: &SessionCredentials);

    async fn edit_profile(&self, edit: ProfileEdit) -> Result<(), PlatformError>;

    /// Creates the community profile for an account that has none.
    async fn setup_profile(&self) -> Result<(), PlatformError>;

    /// Returns the account's web API key, registering one for `domain` if needed.
    async fn get_web_api_key(&self, domain: &str) -> Result<SecretString, PlatformError>;

    async fn get_group(&self, group: &GroupId) -> Result<GroupInfo, PlatformError>;

    async fn join_group(&self, group: &GroupId) -> Result<(), PlatformError>;

    async fn leave_group(&self, group: &GroupId) -> Result<(), PlatformError>;

    async fn kick_from_group(
        &self,
        group: &GroupId,
        member: AccountId,
    ) -> Result<(), PlatformError>;
}
