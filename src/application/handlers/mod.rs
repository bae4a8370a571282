//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod messaging;

pub use messaging::{
    // Admission
    ConnectionHandler, IdentityResolver,
    // Commands and results
    JoinConversationCommand, JoinConversationHandler, JoinConversationResult,
    SendMessageCommand, SendMessageHandler, SendMessageResult,
    // Queries
    GetHistoryHandler, GetHistoryQuery, GetUnreadCountHandler, ListConversationsHandler,
    // Collaborators
    FanoutOutcome, NotificationFanout, RelationshipAuthorizer, RoomSequencer, TypingSignaler,
};
