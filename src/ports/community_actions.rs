//! CommunityActions port - Stateless form actions on the community site.
//!
//! Votes, favourites, subscriptions, comments, follows and group invites
//! are single form posts that only need the current session. They take the
//! session explicitly so the adapter holds no login state of its own.

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use super::PlatformError;
use crate::domain::foundation::{AccountId, AppId, CommentId, GroupId, SharedFileId};
use crate::domain::session::SessionCredentials;

/// Profile addressed by a follow or unfollow request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProfileTarget {
    /// Numeric account id, addressed as `profiles/<id64>`.
    Account(AccountId),
    /// Custom profile URL, addressed as `id/<vanity>`.
    Vanity(String),
}

impl ProfileTarget {
    /// Path segment of the profile on the community site.
    pub fn path(&self) -> String {
        match self {
            ProfileTarget::Account(id) => format!("profiles/{}", id.id64()),
            ProfileTarget::Vanity(name) => format!("id/{}", name),
        }
    }
}

/// Anything that parses as an account id is an account; everything else
/// is taken as a vanity name.
impl FromStr for ProfileTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<AccountId>() {
            Ok(id) => ProfileTarget::Account(id),
            Err(_) => ProfileTarget::Vanity(s.to_string()),
        })
    }
}

impl From<AccountId> for ProfileTarget {
    fn from(id: AccountId) -> Self {
        ProfileTarget::Account(id)
    }
}

impl fmt::Display for ProfileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Vote direction on a shared file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vote {
    Up,
    Down,
}

/// Stateless community form actions.
///
/// # Contract
///
/// - Success is a 200 response whose body reports result code 1
/// - Any other result code maps to `PlatformError::Rejected`
/// - `invite_to_group` reports `DuplicateInvite` and `NotGroupMember` distinctly
#[async_trait]
pub trait CommunityActions: Send + Sync {
    async fn vote_shared_file(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
        vote: Vote,
    ) -> Result<(), PlatformError>;

    async fn set_favourite(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
        app: AppId,
        favourite: bool,
    ) -> Result<(), PlatformError>;

    async fn set_subscribed(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
        app: AppId,
        subscribed: bool,
    ) -> Result<(), PlatformError>;

    /// Opens the file's detail page, counting a unique view.
    async fn preview_shared_file(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
    ) -> Result<(), PlatformError>;

    async fn comment_shared_file(
        &self,
        session: &SessionCredentials,
        owner: AccountId,
        file: SharedFileId,
        comment: &str,
    ) -> Result<(), PlatformError>;

    async fn delete_shared_file_comment(
        &self,
        session: &SessionCredentials,
        owner: AccountId,
        file: SharedFileId,
        comment: &CommentId,
    ) -> Result<(), PlatformError>;

    async fn set_following(
        &self,
        session: &SessionCredentials,
        target: &ProfileTarget,
        follow: bool,
    ) -> Result<(), PlatformError>;

    /// Invites one or more accounts. `inviter` names the bot in error reports.
    async fn invite_to_group(
        &self,
        session: &SessionCredentials,
        inviter: &str,
        group: &GroupId,
        invitees: &[AccountId],
    ) -> Result<(), PlatformError>;
}
