//! Messaging command and query handlers.
//!
//! Each inbound client event maps to exactly one handler call that returns a
//! typed result. Outbound events leave only through the connection registry.

mod authorize;
mod connect;
mod get_history;
mod get_unread_count;
mod join_conversation;
mod list_conversations;
mod notify;
mod resolve_identity;
mod send_message;
mod typing;

pub use authorize::RelationshipAuthorizer;
pub use connect::ConnectionHandler;
pub use get_history::{GetHistoryHandler, GetHistoryQuery};
pub use get_unread_count::GetUnreadCountHandler;
pub use join_conversation::{
    JoinConversationCommand, JoinConversationHandler, JoinConversationResult,
};
pub use list_conversations::ListConversationsHandler;
pub use notify::{FanoutOutcome, NotificationFanout};
pub use resolve_identity::IdentityResolver;
pub use send_message::{RoomSequencer, SendMessageCommand, SendMessageHandler, SendMessageResult};
pub use typing::TypingSignaler;
