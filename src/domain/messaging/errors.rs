//! Messaging error taxonomy.

use thiserror::Error;

use crate::domain::foundation::{AuthError, DomainError, ValidationError};

/// Why a messaging operation between two identities was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No booking has ever linked the two identities.
    NoBookingRelationship,
    /// An identity tried to open a conversation with itself.
    SelfConversation,
}

impl DenialReason {
    pub fn user_message(&self) -> &'static str {
        match self {
            DenialReason::NoBookingRelationship => {
                "You can only message users you have a booking with"
            }
            DenialReason::SelfConversation => "You cannot message yourself",
        }
    }
}

/// Errors surfaced by the messaging core.
///
/// Best-effort delivery failures are deliberately absent: they are logged
/// and never reach the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagingError {
    /// Credential or account check failed. Fatal to the connection attempt.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The pair has no messaging relationship right now.
    #[error("Permission denied: {}", .reason.user_message())]
    PermissionDenied { reason: DenialReason },

    /// Client input was rejected before any side effect.
    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] ValidationError),

    /// A store was unreachable. The client may retry with backoff.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl MessagingError {
    pub fn permission_denied(reason: DenialReason) -> Self {
        MessagingError::PermissionDenied { reason }
    }

    /// Stable wire code.
    pub fn code(&self) -> &'static str {
        match self {
            MessagingError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            MessagingError::PermissionDenied { .. } => "PERMISSION_DENIED",
            MessagingError::InvalidMessage(_) => "INVALID_MESSAGE",
            MessagingError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    /// Only infrastructure failures are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MessagingError::StorageUnavailable(_))
    }
}

impl From<DomainError> for MessagingError {
    fn from(err: DomainError) -> Self {
        MessagingError::StorageUnavailable(err.to_string())
    }
}

impl From<AuthError> for MessagingError {
    fn from(_: AuthError) -> Self {
        MessagingError::AuthenticationFailed
    }
}
