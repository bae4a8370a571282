//! Conversation summary store port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::messaging::ConversationSummary;

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Inserts the pair's row or updates `last_message_at` and `active`.
    async fn upsert(&self, summary: &ConversationSummary) -> Result<(), DomainError>;

    /// Every summary `user_id` participates in, most recent first.
    async fn list_for_identity(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, DomainError>;
}
