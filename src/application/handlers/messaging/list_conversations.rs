//! ListConversationsHandler - Query handler for a user's recent conversations.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::messaging::{ConversationOverview, MessagingError};
use crate::ports::{ConversationRepository, MessageRepository};

/// Handler for listing conversations with per-counterpart unread badges.
pub struct ListConversationsHandler {
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl ListConversationsHandler {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    /// Most recent first.
    pub async fn handle(&self, user_id: &UserId) -> Result<Vec<ConversationOverview>, MessagingError> {
        let summaries = self.conversations.list_for_identity(user_id).await?;

        let mut overviews = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let Some(counterpart) = summary.counterpart(user_id).cloned() else {
                tracing::warn!(
                    user_id = %user_id,
                    room_id = %summary.room_id,
                    "Summary listed for non-participant"
                );
                continue;
            };
            let unread_count = self.messages.count_unread_from(user_id, &counterpart).await?;
            overviews.push(ConversationOverview {
                summary,
                counterpart,
                unread_count,
            });
        }

        Ok(overviews)
    }
}
