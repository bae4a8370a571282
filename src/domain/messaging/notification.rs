//! Durable notifications for recipients who were not watching a conversation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Identity, NotificationId, Timestamp, UserId};

use super::{Message, MessageKind};

/// Longest content excerpt placed in a notification body.
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Message,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Message => "message",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification record. Read state is tracked independently of the
/// message it was created for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<Timestamp>,
}

impl Notification {
    /// Builds the notification for a message the recipient has not seen live.
    pub fn for_message(message: &Message, sender: &Identity) -> Self {
        let body = match message.kind {
            MessageKind::Text => preview(&message.content),
            MessageKind::Image => "Sent an image".to_string(),
            MessageKind::File => "Sent a file".to_string(),
        };

        Self {
            id: NotificationId::new(),
            recipient_id: message.receiver_id.clone(),
            title: format!("New message from {}", sender.display_name_or_id()),
            body,
            kind: NotificationKind::Message,
            created_at: Timestamp::now(),
            read_at: None,
        }
    }
}

fn preview(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    cut.push('…');
    cut
}
