//! ConnectionRegistry port - who is online, on which connections, in which rooms.
//!
//! The registry is the only shared mutable in-memory state of the messaging
//! core. It is owned by the server process and handed to every connection
//! handler, never reached through a global.
//!
//! ## Use Case
//!
//! 1. Client passes identity resolution, handler calls `register`
//!    (the connection is now reachable through its identity's personal room)
//! 2. Client joins a conversation, handler calls `join_room`
//! 3. A message is persisted, pipeline calls `send_to_room`
//! 4. Pipeline asks `is_present_in_room` for the recipient; if false, fan-out
//!    calls `send_to_identity` with a notification
//! 5. Socket closes, handler calls `unregister`, dropping all memberships
//!
//! Operations never perform I/O. Outbound events are pushed onto each
//! connection's own unbounded channel and written to the socket by that
//! connection's writer task.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::foundation::{ConnectionId, Identity, UserId};
use crate::domain::messaging::{Message, RoomId};

/// Events the core pushes to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundEvent {
    #[serde(rename_all = "camelCase")]
    JoinedConversation { room_id: String },

    NewMessage(Message),

    #[serde(rename_all = "camelCase")]
    MessageNotification { message: Message, unread_count: u64 },

    #[serde(rename_all = "camelCase")]
    UserTyping { user_id: UserId, is_typing: bool },

    PermissionDenied { reason: String },

    #[serde(rename_all = "camelCase")]
    MessageError { code: String, reason: String },
}

/// Sending half of a connection's outbox.
pub type ConnectionSender = mpsc::UnboundedSender<OutboundEvent>;

/// Outcome of a fan-out call.
///
/// `failed` counts connections whose outbox was already closed (the socket
/// is going away). These are best-effort losses, not errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Result of removing a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnected {
    pub identity: Identity,
    /// True when this was the identity's last live connection.
    pub went_offline: bool,
}

/// Errors that can occur in connection registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionRegistryError {
    /// Connection not found in registry
    #[error("Connection not registered: {0}")]
    NotFound(ConnectionId),

    /// Connection ID already in use
    #[error("Connection already registered: {0}")]
    AlreadyRegistered(ConnectionId),
}

/// Port for tracking live connections and their room memberships.
///
/// Implementations must:
/// - Be safe under concurrent register/unregister/lookup
/// - Allow multiple connections per identity (tabs, devices)
/// - Never leave a connection joined to a room it was not explicitly joined to
pub trait ConnectionRegistry: Send + Sync {
    /// Add a connection. It is implicitly reachable through `send_to_identity`.
    fn register(
        &self,
        connection_id: ConnectionId,
        identity: Identity,
        outbox: ConnectionSender,
    ) -> Result<(), ConnectionRegistryError>;

    /// Remove a connection and all of its room memberships.
    ///
    /// Returns `None` if the connection was not registered.
    fn unregister(&self, connection_id: &ConnectionId) -> Option<Disconnected>;

    /// Identity bound to a live connection.
    fn identity_of(&self, connection_id: &ConnectionId) -> Option<Identity>;

    /// Join a registered connection to a conversation room. Idempotent.
    fn join_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), ConnectionRegistryError>;

    /// True if `user_id` has at least one live connection joined to the room.
    fn is_present_in_room(&self, user_id: &UserId, room_id: &RoomId) -> bool;

    /// True if `user_id` has at least one live connection anywhere.
    fn is_online(&self, user_id: &UserId) -> bool;

    /// Deliver to every connection joined to the room, optionally skipping
    /// all connections of one identity.
    fn send_to_room(
        &self,
        room_id: &RoomId,
        event: &OutboundEvent,
        exclude: Option<&UserId>,
    ) -> DeliveryReport;

    /// Deliver to every live connection of an identity (its personal room).
    fn send_to_identity(&self, user_id: &UserId, event: &OutboundEvent) -> DeliveryReport;

    /// Deliver to one connection.
    fn send_to_connection(&self, connection_id: &ConnectionId, event: &OutboundEvent) -> bool;
}
