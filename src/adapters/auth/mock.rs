//! Mock authentication adapter for testing.
//!
//! Implements the `Authenticator` port without talking to the platform.
//!
//! # Example
//!
//! ```ignore
//! use tradebot::adapters::auth::MockAuthenticator;
//!
//! let authenticator = MockAuthenticator::new()
//!     .with_session("tradebot01", session_credentials);
//!
//! let session = authenticator.log_in(&credentials).await?;
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::session::{AuthError, ChallengeDelivery, LoginCredentials, SessionCredentials};
use crate::ports::Authenticator;

/// Mock authenticator for testing.
///
/// Account names map to the session they log in to. Unknown accounts return
/// `InvalidCredentials`.
#[derive(Debug, Default)]
pub struct MockAuthenticator {
    sessions: RwLock<HashMap<String, SessionCredentials>>,
    /// Guard code demanded before login succeeds, per account.
    guard_codes: RwLock<HashMap<String, String>>,
    /// Optional error to return for every attempt
    force_error: RwLock<Option<AuthError>>,
    attempts: RwLock<Vec<String>>,
}

impl MockAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `account_name` log in to `session`.
    pub fn with_session(self, account_name: impl Into<String>, session: SessionCredentials) -> Self {
        self.add_session(account_name, session);
        self
    }

    /// Requires `code` as the guard code for `account_name`.
    pub fn with_guard_code(self, account_name: impl Into<String>, code: impl Into<String>) -> Self {
        self.guard_codes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account_name.into(), code.into());
        self
    }

    /// Forces every attempt to fail with `error`.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    pub fn clear_error(&self) {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn add_session(&self, account_name: impl Into<String>, session: SessionCredentials) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account_name.into(), session);
    }

    /// Account names of every login attempt, in order.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn log_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<SessionCredentials, AuthError> {
        let account = credentials.account_name().to_string();
        self.attempts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(account.clone());

        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        let required = self
            .guard_codes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&account)
            .cloned();
        if let Some(required) = required {
            match credentials.two_factor().guard_code.as_deref() {
                None => {
                    return Err(AuthError::TwoFactorRequired {
                        delivery: ChallengeDelivery::MobileAuthenticator,
                    })
                }
                Some(code) if code != required => return Err(AuthError::InvalidTwoFactorCode),
                Some(_) => {}
            }
        }

        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&account)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::domain::session::{SessionCookies, TwoFactorMaterial};
    use secrecy::SecretString;

    fn session() -> SessionCredentials {
        SessionCredentials::new(
            SessionCookies::new(["steamLoginSecure=abc"]).unwrap(),
            SessionId::new("sess-1").unwrap(),
        )
    }

    fn credentials(name: &str) -> LoginCredentials {
        LoginCredentials::new(
            name,
            Some(SecretString::new("hunter2".to_string())),
            TwoFactorMaterial::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn known_account_logs_in() {
        let auth = MockAuthenticator::new().with_session("tradebot01", session());

        let result = auth.log_in(&credentials("tradebot01")).await;

        assert_eq!(result.unwrap(), session());
        assert_eq!(auth.attempts(), vec!["tradebot01".to_string()]);
    }

    #[tokio::test]
    async fn unknown_account_is_rejected() {
        let auth = MockAuthenticator::new();
        let result = auth.log_in(&credentials("nobody")).await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn guard_code_challenge_then_success() {
        let auth = MockAuthenticator::new()
            .with_session("tradebot01", session())
            .with_guard_code("tradebot01", "F4K3C");

        let first = auth.log_in(&credentials("tradebot01")).await;
        assert!(matches!(first, Err(AuthError::TwoFactorRequired { .. })));

        let wrong = auth
            .log_in(&credentials("tradebot01").with_guard_code("XXXXX"))
            .await;
        assert_eq!(wrong.unwrap_err(), AuthError::InvalidTwoFactorCode);

        let retried = auth
            .log_in(&credentials("tradebot01").with_guard_code("F4K3C"))
            .await;
        assert!(retried.is_ok());
    }

    #[tokio::test]
    async fn forced_error_wins() {
        let auth = MockAuthenticator::new()
            .with_session("tradebot01", session())
            .with_error(AuthError::RateLimited);

        assert_eq!(
            auth.log_in(&credentials("tradebot01")).await.unwrap_err(),
            AuthError::RateLimited
        );

        auth.clear_error();
        assert!(auth.log_in(&credentials("tradebot01")).await.is_ok());
    }
}
