//! Credential verification port.
//!
//! This port defines the contract for validating bearer tokens presented at
//! connection time. It is provider-agnostic - the shipped adapter checks
//! HS256 JWTs, and a mock exists for tests.
//!
//! All implementations MUST validate the signature and the expiry (`exp`).
//! Issuer and audience are validated when configured.
//!
//! Token validity alone does not admit a connection: the account may have
//! been deactivated since issuance, which is the `AccountReader`'s concern.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, TokenClaims};

/// Validates access tokens and extracts the subject.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<TokenClaims, AuthError>;
}
