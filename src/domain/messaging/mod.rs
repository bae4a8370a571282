//! Messaging domain - booking-gated chat between customers and vendors.
//!
//! - `room` - Order-independent conversation room identifiers
//! - `message` - Message entity, kinds, attachments and draft validation
//! - `conversation` - Per-pair conversation summaries
//! - `notification` - Durable notifications for passive delivery
//! - `errors` - Error taxonomy surfaced to clients

mod conversation;
mod errors;
mod message;
mod notification;
mod room;

pub use conversation::{ConversationOverview, ConversationSummary};
pub use errors::{DenialReason, MessagingError};
pub use message::{
    Attachment, Message, MessageDraft, MessageKind, MessageLimits, ValidatedMessage,
};
pub use notification::{Notification, NotificationKind};
pub use room::RoomId;
