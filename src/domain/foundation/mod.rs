//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the bot domain.

mod errors;
mod events;
mod ids;
mod result_code;
mod session_status;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use events::{names, EventId, Listener, ListenerId, PlatformEvent, SourceId};
pub use ids::{AccountId, AppId, CommentId, ContextId, GroupId, SessionId, SharedFileId};
pub use result_code::ResultCode;
pub use session_status::SessionStatus;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
