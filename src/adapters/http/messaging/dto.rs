//! HTTP DTOs for messaging endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::messaging::{ConversationOverview, Message};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query string for `GET /api/messages/:other_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    /// Page size; clamped server-side.
    #[serde(default)]
    pub limit: Option<u32>,
    /// RFC 3339 instant; only older messages are returned.
    #[serde(default)]
    pub before: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub room_id: String,
    /// Oldest first.
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub room_id: String,
    pub other_user_id: String,
    pub last_message_at: String,
    pub active: bool,
    pub unread_count: u64,
}

impl From<ConversationOverview> for ConversationResponse {
    fn from(overview: ConversationOverview) -> Self {
        Self {
            room_id: overview.summary.room_id.key(),
            other_user_id: overview.counterpart.to_string(),
            last_message_at: overview.summary.last_message_at.to_rfc3339(),
            active: overview.summary.active,
            unread_count: overview.unread_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationResponse>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Whether the same request may succeed later.
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            retryable: false,
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::messaging::{ConversationSummary, RoomId};

    #[test]
    fn conversation_response_is_camel_case_with_counterpart() {
        let me = UserId::new("cust").unwrap();
        let other = UserId::new("vend").unwrap();
        let overview = ConversationOverview {
            summary: ConversationSummary::new(RoomId::for_pair(&me, &other), Timestamp::now()),
            counterpart: other,
            unread_count: 3,
        };

        let json = serde_json::to_value(ConversationResponse::from(overview)).unwrap();
        assert_eq!(json["roomId"], "cust_vend");
        assert_eq!(json["otherUserId"], "vend");
        assert_eq!(json["unreadCount"], 3);
    }

    #[test]
    fn history_params_default_to_none() {
        let params: HistoryParams = serde_json::from_str("{}").unwrap();
        assert!(params.limit.is_none());
        assert!(params.before.is_none());
    }

    #[test]
    fn error_response_serializes_code_and_retryable() {
        let json = serde_json::to_value(
            ErrorResponse::new("STORAGE_UNAVAILABLE", "down").retryable(true),
        )
        .unwrap();
        assert_eq!(json["error_code"], "STORAGE_UNAVAILABLE");
        assert_eq!(json["retryable"], true);
    }
}
