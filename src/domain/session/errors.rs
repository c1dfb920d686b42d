//! Authentication error types.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};

/// How the platform delivered a two-factor challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeDelivery {
    /// Guard code sent by email; the domain hint is shown to the operator.
    Email { domain: Option<String> },
    /// Code must be read from the mobile authenticator.
    MobileAuthenticator,
}

/// Authentication errors that can occur while establishing a session.
///
/// These errors are **domain-centric** - they describe what went wrong
/// from the bot's perspective, not the authenticator's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Credentials were incomplete; raised before any network exchange.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The platform rejected the account name or password.
    #[error("Invalid account name or password")]
    InvalidCredentials,

    /// The platform wants a guard code delivered out of band.
    #[error("Two-factor code required ({delivery:?})")]
    TwoFactorRequired { delivery: ChallengeDelivery },

    /// The supplied guard code was rejected.
    #[error("Two-factor code rejected")]
    InvalidTwoFactorCode,

    /// Too many login attempts.
    #[error("Login rate limited")]
    RateLimited,

    /// The authentication service could not be reached.
    #[error("Authentication service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The platform returned session values that failed validation.
    #[error("Malformed session returned by platform: {0}")]
    MalformedSession(#[from] ValidationError),
}

impl AuthError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::MissingCredentials(_) => ErrorCode::MissingCredentials,
            AuthError::InvalidCredentials | AuthError::InvalidTwoFactorCode => {
                ErrorCode::InvalidCredentials
            }
            AuthError::TwoFactorRequired { .. } => ErrorCode::TwoFactorRequired,
            AuthError::RateLimited => ErrorCode::RateLimited,
            AuthError::ServiceUnavailable(_) => ErrorCode::Transport,
            AuthError::MalformedSession(_) => ErrorCode::ValidationFailed,
        }
    }
}
