//! JoinConversationHandler - enter a two-party room and catch up on unread messages.

use std::sync::Arc;

use crate::domain::foundation::{ConnectionId, Timestamp, UserId};
use crate::domain::messaging::{MessagingError, RoomId};
use crate::ports::{ConnectionRegistry, MessageRepository};

use super::RelationshipAuthorizer;

/// Command to join the conversation with another identity.
#[derive(Debug, Clone)]
pub struct JoinConversationCommand {
    pub connection_id: ConnectionId,
    pub other_id: UserId,
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinConversationResult {
    pub room_id: RoomId,
    /// Messages from the other party that transitioned to read.
    pub marked_read: u64,
}

pub struct JoinConversationHandler {
    authorizer: Arc<RelationshipAuthorizer>,
    registry: Arc<dyn ConnectionRegistry>,
    messages: Arc<dyn MessageRepository>,
}

impl JoinConversationHandler {
    pub fn new(
        authorizer: Arc<RelationshipAuthorizer>,
        registry: Arc<dyn ConnectionRegistry>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            authorizer,
            registry,
            messages,
        }
    }

    /// Authorize, mark prior messages read, then join.
    ///
    /// Membership only changes after both the authorization and the read
    /// marking succeed, so a failed join leaves the registry untouched.
    pub async fn handle(
        &self,
        cmd: JoinConversationCommand,
    ) -> Result<JoinConversationResult, MessagingError> {
        let identity = self
            .registry
            .identity_of(&cmd.connection_id)
            .ok_or(MessagingError::AuthenticationFailed)?;

        if let Err(e) = self
            .authorizer
            .ensure_can_message(&identity.id, &cmd.other_id)
            .await
        {
            tracing::info!(
                connection_id = %cmd.connection_id,
                user_id = %identity.id,
                other_id = %cmd.other_id,
                "Join denied: {}",
                e
            );
            return Err(e);
        }

        let marked_read = self
            .messages
            .mark_read(&identity.id, &cmd.other_id, Timestamp::now())
            .await
            .map_err(|e| {
                tracing::error!(user_id = %identity.id, error = %e, "Failed to mark messages read");
                MessagingError::from(e)
            })?;

        let room_id = RoomId::for_pair(&identity.id, &cmd.other_id);
        self.registry
            .join_room(&cmd.connection_id, &room_id)
            .map_err(|_| MessagingError::AuthenticationFailed)?;

        tracing::debug!(
            connection_id = %cmd.connection_id,
            room_id = %room_id,
            marked_read,
            "Joined conversation"
        );

        Ok(JoinConversationResult {
            room_id,
            marked_read,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryBookingStore, InMemoryMessageStore};
    use crate::adapters::websocket::InMemoryConnectionRegistry;
    use crate::domain::foundation::{DomainError, Identity, Role};
    use crate::domain::messaging::{DenialReason, Message, MessageDraft, MessageLimits};
    use crate::ports::HistoryQuery;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn msg(from: &str, to: &str, content: &str) -> Message {
        let validated = MessageDraft {
            sender_id: uid(from),
            receiver_id: uid(to),
            content: content.to_string(),
            kind: None,
            attachments: vec![],
        }
        .validate(&MessageLimits::default())
        .unwrap();
        Message::from_validated(validated, Timestamp::now())
    }

    struct Fixture {
        registry: Arc<InMemoryConnectionRegistry>,
        messages: Arc<InMemoryMessageStore>,
        handler: JoinConversationHandler,
        conn: ConnectionId,
    }

    fn fixture(bookings: InMemoryBookingStore) -> Fixture {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let messages = Arc::new(InMemoryMessageStore::new());
        let handler = JoinConversationHandler::new(
            Arc::new(RelationshipAuthorizer::new(Arc::new(bookings))),
            registry.clone(),
            messages.clone(),
        );

        let conn = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        std::mem::forget(rx);
        registry
            .register(conn, Identity::new(uid("cust"), Role::Customer), tx)
            .unwrap();

        Fixture {
            registry,
            messages,
            handler,
            conn,
        }
    }

    #[tokio::test]
    async fn join_with_booking_enters_room() {
        let f = fixture(InMemoryBookingStore::new().with_booking(uid("cust"), uid("vend")));

        let result = f
            .handler
            .handle(JoinConversationCommand {
                connection_id: f.conn,
                other_id: uid("vend"),
            })
            .await
            .unwrap();

        assert_eq!(result.room_id, RoomId::for_pair(&uid("vend"), &uid("cust")));
        assert!(f.registry.is_present_in_room(&uid("cust"), &result.room_id));
    }

    #[tokio::test]
    async fn join_without_booking_is_denied_and_changes_nothing() {
        let f = fixture(InMemoryBookingStore::new());
        f.messages.append(msg("other", "cust", "hi")).await.unwrap();

        let result = f
            .handler
            .handle(JoinConversationCommand {
                connection_id: f.conn,
                other_id: uid("other"),
            })
            .await;

        assert_eq!(
            result,
            Err(MessagingError::permission_denied(DenialReason::NoBookingRelationship))
        );
        let room = RoomId::for_pair(&uid("cust"), &uid("other"));
        assert!(!f.registry.is_present_in_room(&uid("cust"), &room));
        assert_eq!(f.messages.count_unread(&uid("cust")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn join_marks_prior_messages_from_other_party_read() {
        let f = fixture(
            InMemoryBookingStore::new()
                .with_booking(uid("cust"), uid("vend"))
                .with_booking(uid("cust"), uid("vend2")),
        );
        for i in 0..3 {
            f.messages
                .append(msg("vend", "cust", &format!("m{}", i)))
                .await
                .unwrap();
        }
        f.messages.append(msg("vend2", "cust", "elsewhere")).await.unwrap();

        let result = f
            .handler
            .handle(JoinConversationCommand {
                connection_id: f.conn,
                other_id: uid("vend"),
            })
            .await
            .unwrap();

        assert_eq!(result.marked_read, 3);
        assert_eq!(f.messages.count_unread(&uid("cust")).await.unwrap(), 1);

        let history = f
            .messages
            .history(&HistoryQuery {
                a: uid("cust"),
                b: uid("vend"),
                before: None,
                limit: 10,
            })
            .await
            .unwrap();
        assert!(history.iter().all(|m| m.read_at.is_some()));
    }

    #[tokio::test]
    async fn join_from_unregistered_connection_fails() {
        let f = fixture(InMemoryBookingStore::new().with_booking(uid("cust"), uid("vend")));

        let result = f
            .handler
            .handle(JoinConversationCommand {
                connection_id: ConnectionId::new(),
                other_id: uid("vend"),
            })
            .await;

        assert_eq!(result, Err(MessagingError::AuthenticationFailed));
    }

    struct FailingMarkRead;

    #[async_trait]
    impl MessageRepository for FailingMarkRead {
        async fn append(&self, message: Message) -> Result<Message, DomainError> {
            Ok(message)
        }
        async fn mark_read(&self, _: &UserId, _: &UserId, _: Timestamp) -> Result<u64, DomainError> {
            Err(DomainError::database("write timeout"))
        }
        async fn count_unread(&self, _: &UserId) -> Result<u64, DomainError> {
            Ok(0)
        }
        async fn count_unread_from(&self, _: &UserId, _: &UserId) -> Result<u64, DomainError> {
            Ok(0)
        }
        async fn history(&self, _: &HistoryQuery) -> Result<Vec<Message>, DomainError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn storage_failure_leaves_membership_unchanged() {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let handler = JoinConversationHandler::new(
            Arc::new(RelationshipAuthorizer::new(Arc::new(
                InMemoryBookingStore::new().with_booking(uid("cust"), uid("vend")),
            ))),
            registry.clone(),
            Arc::new(FailingMarkRead),
        );
        let conn = ConnectionId::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry
            .register(conn, Identity::new(uid("cust"), Role::Customer), tx)
            .unwrap();

        let result = handler
            .handle(JoinConversationCommand {
                connection_id: conn,
                other_id: uid("vend"),
            })
            .await;

        assert!(matches!(result, Err(MessagingError::StorageUnavailable(_))));
        let room = RoomId::for_pair(&uid("cust"), &uid("vend"));
        assert!(!registry.is_present_in_room(&uid("cust"), &room));
    }
}
