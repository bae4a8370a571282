//! SendMessage command handler.
//!
//! Drives one message through Validate → Authorize → Persist → Route.
//! A failure in steps 1-3 fails the send and nothing is routed. Routing is
//! best-effort and never undoes the stored message.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::domain::foundation::{Identity, MonotonicClock, UserId};
use crate::domain::messaging::{
    Attachment, ConversationSummary, Message, MessageDraft, MessageLimits, MessagingError, RoomId,
};
use crate::ports::{ConnectionRegistry, ConversationRepository, MessageRepository, OutboundEvent};

use super::{NotificationFanout, RelationshipAuthorizer};

/// Command to send a message to another identity.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    /// The authenticated sender (bound to the connection, never client-supplied).
    pub sender: Identity,
    pub receiver_id: UserId,
    pub content: String,
    /// Raw kind from the client; `None` means text.
    pub kind: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageResult {
    /// The message as persisted.
    pub message: Message,
    /// True when the recipient was not in the room and fan-out ran.
    pub notified: bool,
}

/// Serializes persist-and-broadcast per room.
///
/// Holding a room's turn from clock tick through broadcast makes room
/// members observe messages in `created_at` order. Rooms never contend with
/// each other.
#[derive(Default)]
pub struct RoomSequencer {
    turns: Mutex<HashMap<RoomId, Arc<tokio::sync::Mutex<()>>>>,
}

impl RoomSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive use of the room. Released when the guard drops.
    pub async fn acquire(&self, room_id: &RoomId) -> OwnedMutexGuard<()> {
        let turn = {
            let mut turns = match self.turns.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            // Entries only referenced by the map have no holder and no waiter.
            turns.retain(|_, t| Arc::strong_count(t) > 1);
            turns
                .entry(room_id.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        turn.lock_owned().await
    }

    /// Rooms with a holder or waiter right now.
    #[cfg(test)]
    pub fn active_rooms(&self) -> usize {
        match self.turns.lock() {
            Ok(turns) => turns.values().filter(|t| Arc::strong_count(t) > 1).count(),
            Err(poisoned) => poisoned
                .into_inner()
                .values()
                .filter(|t| Arc::strong_count(t) > 1)
                .count(),
        }
    }
}

/// Handler for the `sendMessage` client event.
pub struct SendMessageHandler {
    authorizer: Arc<RelationshipAuthorizer>,
    messages: Arc<dyn MessageRepository>,
    conversations: Arc<dyn ConversationRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    fanout: Arc<NotificationFanout>,
    clock: Arc<MonotonicClock>,
    sequencer: RoomSequencer,
    limits: MessageLimits,
}

impl SendMessageHandler {
    pub fn new(
        authorizer: Arc<RelationshipAuthorizer>,
        messages: Arc<dyn MessageRepository>,
        conversations: Arc<dyn ConversationRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        fanout: Arc<NotificationFanout>,
        clock: Arc<MonotonicClock>,
    ) -> Self {
        Self {
            authorizer,
            messages,
            conversations,
            registry,
            fanout,
            clock,
            sequencer: RoomSequencer::new(),
            limits: MessageLimits::default(),
        }
    }

    /// Override the default content and attachment limits.
    pub fn with_limits(mut self, limits: MessageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<SendMessageResult, MessagingError> {
        let sender = cmd.sender;

        // 1. Validate
        let validated = MessageDraft {
            sender_id: sender.id.clone(),
            receiver_id: cmd.receiver_id,
            content: cmd.content,
            kind: cmd.kind,
            attachments: cmd.attachments,
        }
        .validate(&self.limits)
        .map_err(|e| {
            tracing::debug!(user_id = %sender.id, error = %e, "Message rejected");
            MessagingError::from(e)
        })?;

        // 2. Authorize, on every send
        if let Err(e) = self
            .authorizer
            .ensure_can_message(&validated.sender_id, &validated.receiver_id)
            .await
        {
            tracing::info!(
                user_id = %validated.sender_id,
                other_id = %validated.receiver_id,
                "Send denied: {}",
                e
            );
            return Err(e);
        }

        let room_id = RoomId::for_pair(&validated.sender_id, &validated.receiver_id);
        let receiver_id = validated.receiver_id.clone();

        let turn = self.sequencer.acquire(&room_id).await;

        // 3. Persist
        let message = Message::from_validated(validated, self.clock.tick());
        let stored = self.messages.append(message).await.map_err(|e| {
            tracing::error!(room_id = %room_id, error = %e, "Failed to persist message");
            MessagingError::from(e)
        })?;

        let summary = ConversationSummary::new(room_id.clone(), stored.created_at);
        self.conversations.upsert(&summary).await.map_err(|e| {
            tracing::error!(
                room_id = %room_id,
                message_id = %stored.id,
                error = %e,
                "Failed to update conversation summary"
            );
            MessagingError::from(e)
        })?;

        // 4. Route
        let report = self
            .registry
            .send_to_room(&room_id, &OutboundEvent::NewMessage(stored.clone()), None);
        drop(turn);

        if report.failed > 0 {
            tracing::warn!(
                target: "delivery_failure",
                room_id = %room_id,
                message_id = %stored.id,
                failed = report.failed,
                "Room broadcast reached closed connections"
            );
        }

        let notified = !self.registry.is_present_in_room(&receiver_id, &room_id);
        if notified {
            if let Err(e) = self.fanout.notify(&stored, &sender).await {
                tracing::warn!(
                    target: "delivery_failure",
                    message_id = %stored.id,
                    user_id = %receiver_id,
                    error = %e,
                    "Notification fan-out failed"
                );
            }
        }

        tracing::debug!(
            room_id = %room_id,
            message_id = %stored.id,
            delivered = report.delivered,
            notified,
            "Message sent"
        );

        Ok(SendMessageResult {
            message: stored,
            notified,
        })
    }
}
