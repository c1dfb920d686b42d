//! SessionStatus enum for tracking the login lifecycle of a bot account.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of the platform session.
///
/// The cycle `Unauthenticated → Authenticating → Authenticated →
/// Unauthenticated` may repeat indefinitely. Cookies handed in directly skip
/// `Authenticating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
}

impl SessionStatus {
    /// Returns true if gated operations run immediately in this status.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated)
    }
}

impl StateMachine for SessionStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            Unauthenticated => vec![Authenticating, Authenticated],
            Authenticating => vec![Authenticated, Unauthenticated],
            Authenticated => vec![Unauthenticated],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Unauthenticated => "Unauthenticated",
            SessionStatus::Authenticating => "Authenticating",
            SessionStatus::Authenticated => "Authenticated",
        };
        write!(f, "{}", s)
    }
}
