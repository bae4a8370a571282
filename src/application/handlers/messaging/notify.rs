//! NotificationFanout - durable notice plus badge update for an absent recipient.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Identity};
use crate::domain::messaging::{Message, Notification};
use crate::ports::{
    ConnectionRegistry, DeliveryReport, MessageRepository, NotificationRepository, OutboundEvent,
};

/// What the fan-out did for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutOutcome {
    pub notification: Notification,
    pub unread_count: u64,
    /// Live deliveries to the recipient's personal room. Zero when offline.
    pub delivery: DeliveryReport,
}

/// Runs when the recipient is not watching the conversation.
///
/// 1. Persist a `Notification` for the recipient
/// 2. Recount the recipient's unread messages
/// 3. Push `messageNotification` to every live connection of the recipient
///
/// An offline recipient is the common case; the stored row is the outcome.
pub struct NotificationFanout {
    notifications: Arc<dyn NotificationRepository>,
    messages: Arc<dyn MessageRepository>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl NotificationFanout {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        messages: Arc<dyn MessageRepository>,
        registry: Arc<dyn ConnectionRegistry>,
    ) -> Self {
        Self {
            notifications,
            messages,
            registry,
        }
    }

    pub async fn notify(
        &self,
        message: &Message,
        sender: &Identity,
    ) -> Result<FanoutOutcome, DomainError> {
        let recipient = &message.receiver_id;

        let notification = self
            .notifications
            .create(Notification::for_message(message, sender))
            .await?;
        let unread_count = self.messages.count_unread(recipient).await?;

        let delivery = if self.registry.is_online(recipient) {
            self.registry.send_to_identity(
                recipient,
                &OutboundEvent::MessageNotification {
                    message: message.clone(),
                    unread_count,
                },
            )
        } else {
            DeliveryReport::default()
        };

        tracing::debug!(
            message_id = %message.id,
            user_id = %recipient,
            unread_count,
            delivered = delivery.delivered,
            "Notification fan-out"
        );

        Ok(FanoutOutcome {
            notification,
            unread_count,
            delivery,
        })
    }
}
