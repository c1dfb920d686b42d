//! Session state: status, artifacts and API capability.

use serde::{Deserialize, Serialize};

use super::SessionCredentials;
use crate::domain::foundation::{SessionStatus, StateMachine, ValidationError};

/// Whether the account's web API key could be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiAccess {
    #[default]
    Unknown,
    Available,
    Unavailable,
}

impl ApiAccess {
    pub fn is_available(&self) -> bool {
        matches!(self, ApiAccess::Available)
    }
}

/// What `SessionState::establish` did with the offered credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Establishment {
    /// Transitioned into `Authenticated`.
    Established,
    /// Already authenticated; new cookies or session id were stored.
    Refreshed,
    /// Already authenticated with identical values; nothing changed.
    Unchanged,
}

/// Mutable session state owned by the bot.
///
/// # Invariants
///
/// - Cookies and session id are stored together (`SessionCredentials`) or
///   not at all.
/// - `Authenticated` implies credentials are present.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    status: SessionStatus,
    credentials: Option<SessionCredentials>,
    api_access: ApiAccess,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status.is_authenticated()
    }

    pub fn credentials(&self) -> Option<&SessionCredentials> {
        self.credentials.as_ref()
    }

    pub fn api_access(&self) -> ApiAccess {
        self.api_access
    }

    pub fn set_api_access(&mut self, api_access: ApiAccess) {
        self.api_access = api_access;
    }

    /// Marks a login exchange as in flight.
    pub fn begin_authenticating(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(SessionStatus::Authenticating)?;
        Ok(())
    }

    /// Returns to `Unauthenticated` after a failed login exchange.
    pub fn authentication_failed(&mut self) -> Result<(), ValidationError> {
        if self.status != SessionStatus::Authenticating {
            return Err(ValidationError::invalid_format(
                "state_transition",
                format!("No login in flight (status {:?})", self.status),
            ));
        }
        self.status = self.status.transition_to(SessionStatus::Unauthenticated)?;
        Ok(())
    }

    /// Stores session credentials and marks the session authenticated.
    pub fn establish(
        &mut self,
        credentials: SessionCredentials,
    ) -> Result<Establishment, ValidationError> {
        if self.is_authenticated() {
            if self.credentials.as_ref() == Some(&credentials) {
                return Ok(Establishment::Unchanged);
            }
            self.credentials = Some(credentials);
            return Ok(Establishment::Refreshed);
        }

        self.status = self.status.transition_to(SessionStatus::Authenticated)?;
        self.credentials = Some(credentials);
        Ok(Establishment::Established)
    }

    /// Discards the session. Returns true if a session was authenticated.
    pub fn end(&mut self) -> bool {
        let was_authenticated = self.is_authenticated();
        self.status = SessionStatus::Unauthenticated;
        self.credentials = None;
        self.api_access = ApiAccess::Unknown;
        was_authenticated
    }
}
