//! Session domain module.
//!
//! Handles the platform login lifecycle: the credentials an operator
//! supplies, the cookies and session id the platform returns, and the
//! state that gates whether operations run now or wait for login.

mod credentials;
mod errors;
mod state;

pub use credentials::{LoginCredentials, SessionCookies, SessionCredentials, TwoFactorMaterial};
pub use errors::{AuthError, ChallengeDelivery};
pub use state::{ApiAccess, Establishment, SessionState};
