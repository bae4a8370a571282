//! PostgreSQL adapters - Database implementations for store ports.
//!
//! - `PostgresMessageRepository` - `messages`
//! - `PostgresChatSessionRepository` - `chat_sessions` (conversation summaries)
//! - `PostgresNotificationRepository` - `notifications`
//! - `PostgresBookingRelationshipReader` - read-only `bookings`
//! - `PostgresAccountReader` - read-only `users`

mod account_reader;
mod booking_relationship_reader;
mod chat_session_repository;
mod message_repository;
mod notification_repository;

pub use account_reader::PostgresAccountReader;
pub use booking_relationship_reader::PostgresBookingRelationshipReader;
pub use chat_session_repository::PostgresChatSessionRepository;
pub use message_repository::PostgresMessageRepository;
pub use notification_repository::PostgresNotificationRepository;

use crate::domain::foundation::{DomainError, ErrorCode};

fn database_error(action: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, "Failed to {}", action);
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}
