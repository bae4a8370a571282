//! Axum router configuration for messaging endpoints.

use axum::{middleware, routing::get, Router};

use crate::adapters::http::middleware::auth_middleware;

use super::handlers::{get_history, health, list_conversations, unread_count, MessagingAppState};

/// Authenticated read endpoints, mounted under `/api`.
///
/// # Routes
/// - `GET /messages/unread-count` - Unread badge
/// - `GET /messages/:other_id` - History page with one counterpart
/// - `GET /conversations` - Conversation list
pub fn messaging_routes() -> Router<MessagingAppState> {
    Router::new()
        .route("/messages/unread-count", get(unread_count))
        .route("/messages/:other_id", get(get_history))
        .route("/conversations", get(list_conversations))
}

/// Complete messaging HTTP router with auth applied and state bound.
///
/// `/health` sits outside the auth layer.
pub fn messaging_router(state: MessagingAppState) -> Router {
    let authenticated = Router::new()
        .nest("/api", messaging_routes())
        .route_layer(middleware::from_fn_with_state(
            state.resolver.clone(),
            auth_middleware,
        ));

    authenticated
        .route("/health", get(health))
        .with_state(state)
}
