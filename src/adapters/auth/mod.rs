//! Authentication adapters.
//!
//! Implementations of the `Authenticator` port:
//!
//! - `mock` - Test implementation that doesn't require the platform

mod mock;

pub use mock::MockAuthenticator;
