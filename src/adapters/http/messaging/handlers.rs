//! HTTP handlers for messaging endpoints.
//!
//! These handlers connect Axum routes to the messaging query handlers. The
//! caller is always the identity injected by the auth middleware.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::DateTime;

use crate::adapters::http::middleware::{AuthState, RequireAuth};
use crate::application::handlers::messaging::{
    GetHistoryHandler, GetHistoryQuery, GetUnreadCountHandler, ListConversationsHandler,
};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::messaging::{MessagingError, RoomId};

use super::dto::{
    ConversationListResponse, ConversationResponse, ErrorResponse, HistoryParams,
    HistoryResponse, UnreadCountResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the messaging HTTP endpoints.
#[derive(Clone)]
pub struct MessagingAppState {
    pub resolver: AuthState,
    pub history: Arc<GetHistoryHandler>,
    pub conversations: Arc<ListConversationsHandler>,
    pub unread: Arc<GetUnreadCountHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/messages/:other_id - One page of history, oldest first.
pub async fn get_history(
    State(state): State<MessagingAppState>,
    RequireAuth(identity): RequireAuth,
    Path(other_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, MessagingApiError> {
    let other_id = UserId::new(other_id)
        .map_err(|e| MessagingApiError::BadRequest(e.to_string()))?;
    let before = params.before.as_deref().map(parse_before).transpose()?;

    let room_id = RoomId::for_pair(&identity.id, &other_id);
    let messages = state
        .history
        .handle(GetHistoryQuery {
            requester: identity.id,
            other_id,
            limit: params.limit,
            before,
        })
        .await?;

    Ok(Json(HistoryResponse {
        room_id: room_id.key(),
        messages,
    }))
}

/// GET /api/conversations - The caller's conversations, most recent first.
pub async fn list_conversations(
    State(state): State<MessagingAppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<impl IntoResponse, MessagingApiError> {
    let overviews = state.conversations.handle(&identity.id).await?;

    Ok(Json(ConversationListResponse {
        conversations: overviews.into_iter().map(ConversationResponse::from).collect(),
    }))
}

/// GET /api/messages/unread-count - Unread messages addressed to the caller.
pub async fn unread_count(
    State(state): State<MessagingAppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<impl IntoResponse, MessagingApiError> {
    let unread_count = state.unread.handle(&identity.id).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// GET /health - Liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn parse_before(raw: &str) -> Result<Timestamp, MessagingApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Timestamp::from_datetime(dt.with_timezone(&chrono::Utc)))
        .map_err(|_| MessagingApiError::BadRequest(format!("'before' is not RFC 3339: {}", raw)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper for HTTP responses.
#[derive(Debug)]
pub enum MessagingApiError {
    Messaging(MessagingError),
    /// Path or query parameters that never reached the core.
    BadRequest(String),
}

impl From<MessagingError> for MessagingApiError {
    fn from(err: MessagingError) -> Self {
        Self::Messaging(err)
    }
}

impl IntoResponse for MessagingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            MessagingApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("BAD_REQUEST", message.clone()),
            ),
            MessagingApiError::Messaging(err) => {
                let status = match err {
                    MessagingError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
                    MessagingError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
                    MessagingError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
                    MessagingError::StorageUnavailable(msg) => {
                        tracing::error!(error = %msg, "Storage unavailable");
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                };
                let message = match err {
                    MessagingError::StorageUnavailable(_) => "Storage unavailable".to_string(),
                    other => other.to_string(),
                };
                (
                    status,
                    ErrorResponse::new(err.code(), message).retryable(err.is_retryable()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
