//! Errors reported by platform capability ports.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ResultCode};

/// Failure of a single platform request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The platform answered with a non-success result code.
    #[error("Platform rejected request: {0}")]
    Rejected(ResultCode),

    /// The account lacks access (API key denied, private inventory...).
    #[error("Access denied")]
    AccessDenied,

    /// The request needs a session the client does not have.
    #[error("Not logged in to the platform")]
    NotLoggedIn,

    /// Group invite attempted by an account outside the group.
    #[error("{account} is not part of the group, therefore unable to invite users")]
    NotGroupMember { account: String },

    /// At least one invitee was already invited or already a member.
    #[error("Failed to send one or more invites due to a user being already invited or in the group")]
    DuplicateInvite,

    /// Non-success HTTP status with no usable body.
    #[error("HTTP {status} from platform")]
    Http { status: u16 },

    /// Network or connection level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response could not be understood.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl PlatformError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PlatformError::Rejected(ResultCode::AccessDenied) | PlatformError::AccessDenied => {
                ErrorCode::AccessDenied
            }
            PlatformError::Rejected(ResultCode::RateLimitExceeded) => ErrorCode::RateLimited,
            PlatformError::Rejected(_)
            | PlatformError::NotGroupMember { .. }
            | PlatformError::DuplicateInvite => ErrorCode::PlatformResult,
            PlatformError::NotLoggedIn => ErrorCode::NotAuthenticated,
            PlatformError::Http { .. } | PlatformError::Transport(_) => ErrorCode::Transport,
            PlatformError::UnexpectedResponse(_) => ErrorCode::InternalError,
        }
    }

    /// True if the failure means the account cannot use the web API.
    pub fn is_access_denied(&self) -> bool {
        self.code() == ErrorCode::AccessDenied
    }
}
