//! Authenticator port for the platform login exchange.
//!
//! The bot never talks the login protocol itself. An `Authenticator`
//! exchanges `LoginCredentials` for session cookies and a session id.
//!
//! # Two-factor challenges
//!
//! When the platform wants a guard code it is delivered out of band (email
//! or mobile authenticator). Implementations report this as
//! `AuthError::TwoFactorRequired`; the caller obtains the code and retries
//! with `LoginCredentials::with_guard_code`.
//!
//! # Example Implementation
//!
//! ```ignore
//! pub struct WebLoginAuthenticator { ... }
//!
//! #[async_trait]
//! impl Authenticator for WebLoginAuthenticator {
//!     async fn log_in(&self, credentials: &LoginCredentials)
//!         -> Result<SessionCredentials, AuthError> {
//!         // 1. Fetch RSA key, encrypt password
//!         // 2. POST login form, answer guard challenge if code present
//!         // 3. Collect cookies and session id
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::domain::session::{AuthError, LoginCredentials, SessionCredentials};

/// Exchanges login credentials for an established platform session.
///
/// # Contract
///
/// Implementations must:
/// - Return cookies and session id together on success
/// - Return `AuthError::InvalidCredentials` for rejected passwords
/// - Return `AuthError::TwoFactorRequired` when a guard code is needed
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn log_in(&self, credentials: &LoginCredentials)
        -> Result<SessionCredentials, AuthError>;
}
