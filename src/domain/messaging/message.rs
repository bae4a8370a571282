//! Chat message entity and inbound draft validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp, UserId, ValidationError};

use super::RoomId;

/// Closed set of message kinds a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    File,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::File => "file",
        }
    }
}

impl Default for MessageKind {
    fn default() -> Self {
        MessageKind::Text
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "file" => Ok(MessageKind::File),
            other => Err(ValidationError::invalid_format(
                "kind",
                format!("unknown message kind '{}'", other),
            )),
        }
    }
}

/// Reference to an already-uploaded file. Upload itself happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Size limits applied when validating a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLimits {
    pub max_content_length: usize,
    pub max_attachments: usize,
}

impl Default for MessageLimits {
    fn default() -> Self {
        Self {
            max_content_length: 4000,
            max_attachments: 10,
        }
    }
}

/// Unvalidated message as received from a client.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    /// Raw kind string; `None` means text.
    pub kind: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// A draft that passed validation and may be authorized and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub kind: MessageKind,
    pub attachments: Vec<Attachment>,
}

impl MessageDraft {
    /// Checks content, kind and attachments. Has no side effects.
    pub fn validate(self, limits: &MessageLimits) -> Result<ValidatedMessage, ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }

        let length = self.content.chars().count();
        if length > limits.max_content_length {
            return Err(ValidationError::too_long(
                "content",
                limits.max_content_length,
                length,
            ));
        }

        let kind = match self.kind.as_deref() {
            None => MessageKind::Text,
            Some(raw) => raw.parse()?,
        };

        if self.attachments.len() > limits.max_attachments {
            return Err(ValidationError::too_long(
                "attachments",
                limits.max_attachments,
                self.attachments.len(),
            ));
        }
        if self.attachments.iter().any(|a| a.url.trim().is_empty()) {
            return Err(ValidationError::empty_field("attachments.url"));
        }

        Ok(ValidatedMessage {
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
            kind,
            attachments: self.attachments,
        })
    }
}

/// A persisted chat message.
///
/// Immutable once stored, except for the one-way `read_at` transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub kind: MessageKind,
    pub attachments: Vec<Attachment>,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<Timestamp>,
}

impl Message {
    /// Builds the record to append, stamped with the server-assigned time.
    pub fn from_validated(validated: ValidatedMessage, created_at: Timestamp) -> Self {
        Self {
            id: MessageId::new(),
            sender_id: validated.sender_id,
            receiver_id: validated.receiver_id,
            content: validated.content,
            kind: validated.kind,
            attachments: validated.attachments,
            created_at,
            read_at: None,
        }
    }

    pub fn room_id(&self) -> RoomId {
        RoomId::for_pair(&self.sender_id, &self.receiver_id)
    }

    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }

    /// Sets `read_at` if unset. Returns whether the message changed.
    pub fn mark_read(&mut self, at: Timestamp) -> bool {
        if self.read_at.is_some() {
            return false;
        }
        self.read_at = Some(at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn draft(content: &str, kind: Option<&str>) -> MessageDraft {
        MessageDraft {
            sender_id: uid("cust-1"),
            receiver_id: uid("vend-1"),
            content: content.to_string(),
            kind: kind.map(str::to_string),
            attachments: vec![],
        }
    }

    #[test]
    fn validate_accepts_plain_text() {
        let validated = draft("Hello", None).validate(&MessageLimits::default()).unwrap();
        assert_eq!(validated.kind, MessageKind::Text);
        assert_eq!(validated.content, "Hello");
    }

    #[test]
    fn validate_rejects_empty_and_whitespace_content() {
        let limits = MessageLimits::default();
        assert_eq!(
            draft("", None).validate(&limits),
            Err(ValidationError::empty_field("content"))
        );
        assert!(draft("  \n\t", None).validate(&limits).is_err());
    }

    #[test]
    fn validate_rejects_unknown_kind() {
        let result = draft("hi", Some("video")).validate(&MessageLimits::default());
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn validate_accepts_every_known_kind() {
        let limits = MessageLimits::default();
        for kind in ["text", "image", "file"] {
            assert!(draft("x", Some(kind)).validate(&limits).is_ok(), "kind {}", kind);
        }
    }

    #[test]
    fn validate_enforces_content_length() {
        let limits = MessageLimits {
            max_content_length: 5,
            max_attachments: 1,
        };
        assert!(draft("12345", None).validate(&limits).is_ok());
        assert_eq!(
            draft("123456", None).validate(&limits),
            Err(ValidationError::too_long("content", 5, 6))
        );
    }

    #[test]
    fn validate_rejects_attachment_without_url() {
        let mut d = draft("see attached", Some("file"));
        d.attachments.push(Attachment {
            url: " ".to_string(),
            name: Some("menu.pdf".to_string()),
            mime_type: None,
            size_bytes: None,
        });
        assert!(d.validate(&MessageLimits::default()).is_err());
    }

    #[test]
    fn validate_rejects_too_many_attachments() {
        let limits = MessageLimits {
            max_content_length: 100,
            max_attachments: 1,
        };
        let mut d = draft("photos", Some("image"));
        for i in 0..2 {
            d.attachments.push(Attachment {
                url: format!("https://cdn.example.com/{}.png", i),
                name: None,
                mime_type: Some("image/png".to_string()),
                size_bytes: None,
            });
        }
        assert!(d.validate(&limits).is_err());
    }

    #[test]
    fn mark_read_is_one_way() {
        let validated = draft("hi", None).validate(&MessageLimits::default()).unwrap();
        let mut message = Message::from_validated(validated, Timestamp::now());
        assert!(message.is_unread());

        let first = Timestamp::now();
        assert!(message.mark_read(first));
        assert!(!message.mark_read(first.plus_micros(10)));
        assert_eq!(message.read_at, Some(first));
    }

    #[test]
    fn message_serializes_camel_case_without_read_at_when_unread() {
        let validated = draft("hi", None).validate(&MessageLimits::default()).unwrap();
        let message = Message::from_validated(validated, Timestamp::now());
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["senderId"], "cust-1");
        assert_eq!(json["receiverId"], "vend-1");
        assert_eq!(json["kind"], "text");
        assert!(json.get("readAt").is_none());
    }

    #[test]
    fn message_room_is_pair_room() {
        let validated = draft("hi", None).validate(&MessageLimits::default()).unwrap();
        let message = Message::from_validated(validated, Timestamp::now());
        assert_eq!(message.room_id(), RoomId::for_pair(&uid("vend-1"), &uid("cust-1")));
    }
}
