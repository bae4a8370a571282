//! Mock authentication adapters for testing.
//!
//! These adapters implement the `SessionValidator` and `AccountReader` ports
//! without a token issuer or an account database.
//!
//! # Example
//!
//! ```ignore
//! use booking_chat::adapters::auth::{MockAccountReader, MockSessionValidator};
//! use booking_chat::domain::foundation::{Role, UserId};
//!
//! let validator = MockSessionValidator::new().with_token("tok-1", "cust-1");
//! let accounts = MockAccountReader::new()
//!     .with_account(UserId::new("cust-1").unwrap(), Role::Customer);
//! ```

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::foundation::{AccountRecord, AuthError, Identity, Role, TokenClaims, UserId};
use crate::ports::{AccountReader, SessionValidator};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock session validator for testing.
///
/// Stores a map of tokens to user ids. Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, UserId>>,
    /// Optional error to return for all validations (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    /// Creates a new empty mock validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token for a user.
    ///
    /// An unparseable user id leaves the token unregistered.
    pub fn with_token(self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        if let Ok(user_id) = UserId::new(user_id) {
            write(&self.tokens).insert(token.into(), user_id);
        }
        self
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *write(&self.force_error) = Some(error);
        self
    }

    /// Removes a token, making it invalid.
    pub fn revoke(&self, token: &str) {
        write(&self.tokens).remove(token);
    }

    /// Returns the number of registered valid tokens.
    pub fn token_count(&self) -> usize {
        read(&self.tokens).len()
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        if let Some(error) = read(&self.force_error).clone() {
            return Err(error);
        }

        read(&self.tokens)
            .get(token)
            .cloned()
            .map(|user_id| TokenClaims { user_id })
            .ok_or(AuthError::InvalidToken)
    }
}

/// Mock account reader for testing.
///
/// Unknown ids return `UserNotFound`.
#[derive(Debug, Default)]
pub struct MockAccountReader {
    accounts: RwLock<HashMap<UserId, AccountRecord>>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockAccountReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active account.
    pub fn with_account(self, user_id: UserId, role: Role) -> Self {
        self.with_record(AccountRecord {
            identity: Identity::new(user_id, role),
            active: true,
        })
    }

    /// Adds a deactivated account.
    pub fn with_inactive_account(self, user_id: UserId, role: Role) -> Self {
        self.with_record(AccountRecord {
            identity: Identity::new(user_id, role),
            active: false,
        })
    }

    /// Adds an account with full control over the record.
    pub fn with_record(self, record: AccountRecord) -> Self {
        self.add(record);
        self
    }

    /// Forces all lookups to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *write(&self.force_error) = Some(error);
        self
    }

    /// Adds or replaces an account at runtime.
    pub fn add(&self, record: AccountRecord) {
        write(&self.accounts).insert(record.identity.id.clone(), record);
    }

    /// Flips an account to inactive. Returns false if unknown.
    pub fn deactivate(&self, user_id: &UserId) -> bool {
        match write(&self.accounts).get_mut(user_id) {
            Some(record) => {
                record.active = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AccountReader for MockAccountReader {
    async fn get_account(&self, user_id: &UserId) -> Result<AccountRecord, AuthError> {
        if let Some(error) = read(&self.force_error).clone() {
            return Err(error);
        }

        read(&self.accounts)
            .get(user_id)
            .cloned()
            .ok_or(AuthError::UserNotFound)
    }
}
