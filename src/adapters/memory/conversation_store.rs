//! In-memory conversation summaries.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::messaging::{ConversationSummary, RoomId};
use crate::ports::ConversationRepository;

/// One summary per room, replaced on every upsert.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    summaries: Arc<RwLock<HashMap<RoomId, ConversationSummary>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, room_id: &RoomId) -> Option<ConversationSummary> {
        self.summaries.read().await.get(room_id).cloned()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationStore {
    async fn upsert(&self, summary: &ConversationSummary) -> Result<(), DomainError> {
        self.summaries
            .write()
            .await
            .insert(summary.room_id.clone(), summary.clone());
        Ok(())
    }

    async fn list_for_identity(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, DomainError> {
        let mut list: Vec<_> = self
            .summaries
            .read()
            .await
            .values()
            .filter(|s| s.room_id.includes(user_id))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(list)
    }
}
