//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `session` - Login credentials, session artifacts and session state
//! - `deferred` - Named FIFO queues of operations waiting for login

pub mod deferred;
pub mod foundation;
pub mod session;
