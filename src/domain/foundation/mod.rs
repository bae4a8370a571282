//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the messaging domain.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AccountRecord, AuthError, Identity, Role, TokenClaims};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ConnectionId, MessageId, NotificationId, UserId};
pub use timestamp::{MonotonicClock, Timestamp};
