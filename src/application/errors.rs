//! Application-level errors.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::session::AuthError;
use crate::ports::PlatformError;

/// Errors returned by bot operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The operation was queued and discarded before it could run.
    #[error("{operation} was cancelled before it could run")]
    Cancelled { operation: &'static str },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The session ended between scheduling and running the operation.
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl BotError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BotError::Auth(err) => err.code(),
            BotError::Platform(err) => err.code(),
            BotError::Cancelled { .. } => ErrorCode::Cancelled,
            BotError::Validation(_) => ErrorCode::ValidationFailed,
            BotError::NotAuthenticated => ErrorCode::NotAuthenticated,
        }
    }
}
