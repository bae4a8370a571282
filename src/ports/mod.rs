//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Identity Ports
//!
//! - `SessionValidator` - Bearer credential verification
//! - `AccountReader` - Current account state (role, active flag)
//!
//! ## Relationship Port
//!
//! - `BookingRelationshipReader` - Booking existence between two identities
//!
//! ## Store Ports
//!
//! - `MessageRepository` - Append-only messages with read marking
//! - `ConversationRepository` - Per-pair conversation summaries
//! - `NotificationRepository` - Durable notifications
//!
//! ## Live Routing Port
//!
//! - `ConnectionRegistry` - Connections, presence and room membership

mod account_reader;
mod booking_relationship_reader;
mod connection_registry;
mod conversation_repository;
mod message_repository;
mod notification_repository;
mod session_validator;

pub use account_reader::AccountReader;
pub use booking_relationship_reader::BookingRelationshipReader;
pub use connection_registry::{
    ConnectionRegistry, ConnectionRegistryError, ConnectionSender, DeliveryReport, Disconnected,
    OutboundEvent,
};
pub use conversation_repository::ConversationRepository;
pub use message_repository::{HistoryQuery, MessageRepository};
pub use notification_repository::NotificationRepository;
pub use session_validator::SessionValidator;
