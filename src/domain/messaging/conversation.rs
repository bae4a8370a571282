//! Conversation summaries ("chat sessions") for recent-conversation listings.

use crate::domain::foundation::{Timestamp, UserId};

use super::RoomId;

/// One row per unordered identity pair, upserted on every new message.
///
/// Never deleted; `active` is cleared instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub room_id: RoomId,
    pub last_message_at: Timestamp,
    pub active: bool,
}

impl ConversationSummary {
    pub fn new(room_id: RoomId, last_message_at: Timestamp) -> Self {
        Self {
            room_id,
            last_message_at,
            active: true,
        }
    }

    pub fn participants(&self) -> (&UserId, &UserId) {
        self.room_id.participants()
    }

    /// The participant that is not `me`.
    pub fn counterpart(&self, me: &UserId) -> Option<&UserId> {
        self.room_id.counterpart(me)
    }
}

/// A summary as seen by one participant, with their unread badge for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationOverview {
    pub summary: ConversationSummary,
    pub counterpart: UserId,
    pub unread_count: u64,
}
