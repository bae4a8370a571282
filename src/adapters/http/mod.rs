//! HTTP adapters - REST API and shared middleware.

pub mod messaging;
pub mod middleware;

pub use messaging::{messaging_router, MessagingAppState};
