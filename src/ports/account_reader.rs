//! Account store port.
//!
//! Looks up the current state of an account by ID: its role, display name
//! and whether it is still active. Used by the identity resolver after token
//! validation, and by notification fan-out to name the sender.

use async_trait::async_trait;

use crate::domain::foundation::{AccountRecord, AuthError, UserId};

/// Read-only access to the external account store.
///
/// # Contract
///
/// Implementations must:
/// - Return the account (active or not) if it exists
/// - Return `AuthError::UserNotFound` if it doesn't
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait AccountReader: Send + Sync {
    async fn get_account(&self, user_id: &UserId) -> Result<AccountRecord, AuthError>;
}
