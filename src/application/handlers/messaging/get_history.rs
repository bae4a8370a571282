//! GetHistoryHandler - Query handler for the messages exchanged with one counterpart.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::messaging::{Message, MessagingError};
use crate::ports::{HistoryQuery, MessageRepository};

use super::RelationshipAuthorizer;

/// Query for one page of conversation history.
#[derive(Debug, Clone)]
pub struct GetHistoryQuery {
    pub requester: UserId,
    pub other_id: UserId,
    pub limit: Option<u32>,
    /// Page backwards from this instant (exclusive).
    pub before: Option<Timestamp>,
}

impl GetHistoryQuery {
    /// Most recent page with the default size.
    pub fn latest(requester: UserId, other_id: UserId) -> Self {
        Self {
            requester,
            other_id,
            limit: None,
            before: None,
        }
    }
}

/// Handler for history fetches.
///
/// Fetching history counts as reading it: unread messages from the other
/// party are marked read exactly as a join would.
pub struct GetHistoryHandler {
    authorizer: Arc<RelationshipAuthorizer>,
    messages: Arc<dyn MessageRepository>,
    page_size: u32,
    max_page_size: u32,
}

impl GetHistoryHandler {
    pub fn new(
        authorizer: Arc<RelationshipAuthorizer>,
        messages: Arc<dyn MessageRepository>,
        page_size: u32,
        max_page_size: u32,
    ) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            authorizer,
            messages,
            page_size: page_size.clamp(1, max_page_size),
            max_page_size,
        }
    }

    pub async fn handle(&self, query: GetHistoryQuery) -> Result<Vec<Message>, MessagingError> {
        self.authorizer
            .ensure_can_message(&query.requester, &query.other_id)
            .await?;

        let marked = self
            .messages
            .mark_read(&query.requester, &query.other_id, Timestamp::now())
            .await?;

        let limit = query
            .limit
            .unwrap_or(self.page_size)
            .clamp(1, self.max_page_size);
        let page = self
            .messages
            .history(&HistoryQuery {
                a: query.requester.clone(),
                b: query.other_id.clone(),
                before: query.before,
                limit,
            })
            .await?;

        tracing::debug!(
            user_id = %query.requester,
            other_id = %query.other_id,
            returned = page.len(),
            marked_read = marked,
            "History fetched"
        );
        Ok(page)
    }
}
