//! WebSocket message types for the chat protocol.
//!
//! Defines the protocol between server and connected clients:
//! - Client → Server: join, send, typing start/stop, ping
//! - Server → Client: the core's `OutboundEvent`s plus connection-level
//!   `connected` and `pong` frames
//!
//! Every frame is a JSON object tagged by `"type"`.

use serde::{Deserialize, Serialize};

use crate::domain::messaging::{Attachment, DenialReason, MessagingError};
use crate::ports::OutboundEvent;

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinConversation { other_user_id: String },

    #[serde(rename_all = "camelCase")]
    SendMessage {
        receiver_id: String,
        content: String,
        #[serde(default)]
        kind: Option<String>,
        #[serde(default)]
        attachments: Vec<Attachment>,
    },

    #[serde(rename_all = "camelCase")]
    TypingStart { receiver_id: String },

    #[serde(rename_all = "camelCase")]
    TypingStop { receiver_id: String },

    /// Heartbeat request.
    Ping,
}

// ============================================
// Server → Client Messages
// ============================================

/// Frames that concern the connection itself rather than a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlMessage {
    /// Sent once, right after the connection is registered.
    #[serde(rename_all = "camelCase")]
    Connected {
        connection_id: String,
        user_id: String,
        timestamp: String,
    },

    /// Heartbeat response.
    Pong { timestamp: String },
}

/// Anything written to the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Event(OutboundEvent),
    Control(ControlMessage),
}

impl From<OutboundEvent> for ServerMessage {
    fn from(event: OutboundEvent) -> Self {
        ServerMessage::Event(event)
    }
}

impl From<ControlMessage> for ServerMessage {
    fn from(control: ControlMessage) -> Self {
        ServerMessage::Control(control)
    }
}

/// Reply owed to the caller when an operation fails.
pub fn error_event(error: &MessagingError) -> OutboundEvent {
    match error {
        MessagingError::PermissionDenied { reason } => denial_event(*reason),
        other => OutboundEvent::MessageError {
            code: other.code().to_string(),
            reason: other.to_string(),
        },
    }
}

fn denial_event(reason: DenialReason) -> OutboundEvent {
    OutboundEvent::PermissionDenied {
        reason: reason.user_message().to_string(),
    }
}

/// Reply for a frame that could not be understood.
pub fn malformed_frame(detail: impl std::fmt::Display) -> OutboundEvent {
    OutboundEvent::MessageError {
        code: "INVALID_MESSAGE".to_string(),
        reason: format!("Malformed frame: {}", detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ValidationError;

    #[test]
    fn parses_join_conversation() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"joinConversation","otherUserId":"vend-1"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinConversation {
                other_user_id: "vend-1".to_string()
            }
        );
    }

    #[test]
    fn parses_send_message_with_defaults() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"sendMessage","receiverId":"vend-1","content":"Hello"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::SendMessage {
                receiver_id: "vend-1".to_string(),
                content: "Hello".to_string(),
                kind: None,
                attachments: vec![],
            }
        );
    }

    #[test]
    fn parses_send_message_with_attachment() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"sendMessage","receiverId":"v","content":"menu","kind":"file",
                "attachments":[{"url":"https://cdn.example.com/menu.pdf","mimeType":"application/pdf"}]}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::SendMessage { kind, attachments, .. } => {
                assert_eq!(kind.as_deref(), Some("file"));
                assert_eq!(attachments[0].mime_type.as_deref(), Some("application/pdf"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_typing_and_ping() {
        let start: ClientMessage =
            serde_json::from_str(r#"{"type":"typingStart","receiverId":"v"}"#).unwrap();
        let stop: ClientMessage =
            serde_json::from_str(r#"{"type":"typingStop","receiverId":"v"}"#).unwrap();
        let ping: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();

        assert!(matches!(start, ClientMessage::TypingStart { .. }));
        assert!(matches!(stop, ClientMessage::TypingStop { .. }));
        assert_eq!(ping, ClientMessage::Ping);
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"deleteEverything"}"#).is_err());
    }

    #[test]
    fn control_and_event_frames_share_type_tag() {
        let pong = serde_json::to_value(ServerMessage::from(ControlMessage::Pong {
            timestamp: "t".to_string(),
        }))
        .unwrap();
        assert_eq!(pong["type"], "pong");

        let event = serde_json::to_value(ServerMessage::from(OutboundEvent::PermissionDenied {
            reason: "no".to_string(),
        }))
        .unwrap();
        assert_eq!(event["type"], "permissionDenied");
    }

    #[test]
    fn permission_denied_maps_to_denial_event() {
        let event = error_event(&MessagingError::permission_denied(
            DenialReason::NoBookingRelationship,
        ));
        assert_eq!(
            event,
            OutboundEvent::PermissionDenied {
                reason: "You can only message users you have a booking with".to_string()
            }
        );
    }

    #[test]
    fn other_errors_map_to_message_error_with_code() {
        let event = error_event(&MessagingError::InvalidMessage(ValidationError::empty_field(
            "content",
        )));
        match event {
            OutboundEvent::MessageError { code, .. } => assert_eq!(code, "INVALID_MESSAGE"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
