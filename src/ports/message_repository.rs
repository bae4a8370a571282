//! Durable message store port.
//!
//! The store is the source of truth for message content; the in-memory
//! connection registry never holds any. Each method is a single-row or
//! single-statement operation, and implementations are expected to make each
//! one atomic on its own. There are no cross-call transactions.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::messaging::Message;

/// Page request for the messages exchanged between two identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub a: UserId,
    pub b: UserId,
    /// Only messages created strictly before this instant.
    pub before: Option<Timestamp>,
    pub limit: u32,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Appends a new message and returns it as stored.
    async fn append(&self, message: Message) -> Result<Message, DomainError>;

    /// Sets `read_at` on every unread message from `sender` to `receiver`.
    ///
    /// Messages that already have `read_at` are left untouched. Returns the
    /// number of messages that transitioned.
    async fn mark_read(
        &self,
        receiver: &UserId,
        sender: &UserId,
        at: Timestamp,
    ) -> Result<u64, DomainError>;

    /// Number of unread messages addressed to `user_id`, from anyone.
    async fn count_unread(&self, user_id: &UserId) -> Result<u64, DomainError>;

    /// Number of unread messages from `sender` to `receiver`.
    async fn count_unread_from(
        &self,
        receiver: &UserId,
        sender: &UserId,
    ) -> Result<u64, DomainError>;

    /// The newest `limit` messages of the pair matching the query, returned
    /// oldest first.
    async fn history(&self, query: &HistoryQuery) -> Result<Vec<Message>, DomainError>;
}
