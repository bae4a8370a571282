//! IdentityResolver - turns a bearer credential into a verified Identity.

use std::sync::Arc;

use crate::domain::foundation::{AuthError, Identity};
use crate::domain::messaging::MessagingError;
use crate::ports::{AccountReader, SessionValidator};

/// Authenticates a connecting client.
///
/// 1. Validate the token (signature, expiry)
/// 2. Look up the account's current role and active flag
///
/// Fails closed: any failure in either step is `AuthenticationFailed`.
pub struct IdentityResolver {
    validator: Arc<dyn SessionValidator>,
    accounts: Arc<dyn AccountReader>,
}

impl IdentityResolver {
    pub fn new(validator: Arc<dyn SessionValidator>, accounts: Arc<dyn AccountReader>) -> Self {
        Self {
            validator,
            accounts,
        }
    }

    pub async fn resolve(&self, token: &str) -> Result<Identity, MessagingError> {
        self.try_resolve(token).await.map_err(|e| {
            match &e {
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!(error = %msg, "Identity resolution unavailable");
                }
                other => {
                    tracing::info!(reason = %other, "Connection refused");
                }
            }
            MessagingError::AuthenticationFailed
        })
    }

    async fn try_resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let claims = self.validator.validate(token).await?;
        let account = self.accounts.get_account(&claims.user_id).await?;

        if !account.active {
            return Err(AuthError::AccountDisabled);
        }
        // The account store is keyed by id; a mismatch means a broken adapter.
        if account.identity.id != claims.user_id {
            return Err(AuthError::UserNotFound);
        }

        Ok(account.identity)
    }
}
