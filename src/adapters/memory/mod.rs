//! In-memory store adapters.
//!
//! Implement every store port over `tokio::sync::RwLock`-guarded collections.
//! Useful for testing and local development without PostgreSQL.

mod booking_store;
mod conversation_store;
mod message_store;
mod notification_store;

pub use booking_store::InMemoryBookingStore;
pub use conversation_store::InMemoryConversationStore;
pub use message_store::InMemoryMessageStore;
pub use notification_store::InMemoryNotificationStore;
