//! HTTP adapter for the read side of messaging.
//!
//! - `GET /api/messages/:other_id` - One page of history with a counterpart
//! - `GET /api/messages/unread-count` - Unread badge for the caller
//! - `GET /api/conversations` - The caller's conversations, most recent first
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{MessagingApiError, MessagingAppState};
pub use routes::{messaging_router, messaging_routes};
