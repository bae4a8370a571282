//! End-to-end messaging scenarios over the in-memory registry and stores.
//!
//! Each test wires the real handlers the way the server does and plays the
//! part of one or more connected clients by holding their outbox receivers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use booking_chat::adapters::memory::{
    InMemoryBookingStore, InMemoryConversationStore, InMemoryMessageStore,
    InMemoryNotificationStore,
};
use booking_chat::adapters::websocket::InMemoryConnectionRegistry;
use booking_chat::application::handlers::messaging::{
    GetUnreadCountHandler, JoinConversationCommand, JoinConversationHandler,
    NotificationFanout, RelationshipAuthorizer, SendMessageCommand, SendMessageHandler,
};
use booking_chat::domain::foundation::{
    ConnectionId, DomainError, Identity, MonotonicClock, Role, Timestamp, UserId,
};
use booking_chat::domain::messaging::{DenialReason, Message, MessagingError, RoomId};
use booking_chat::ports::{ConnectionRegistry, HistoryQuery, MessageRepository, OutboundEvent};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Message store that counts `mark_read` calls.
struct CountingMessageStore {
    inner: InMemoryMessageStore,
    mark_read_calls: AtomicUsize,
}

#[async_trait]
impl MessageRepository for CountingMessageStore {
    async fn append(&self, message: Message) -> Result<Message, DomainError> {
        self.inner.append(message).await
    }

    async fn mark_read(
        &self,
        receiver: &UserId,
        sender: &UserId,
        at: Timestamp,
    ) -> Result<u64, DomainError> {
        self.mark_read_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.mark_read(receiver, sender, at).await
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, DomainError> {
        self.inner.count_unread(user_id).await
    }

    async fn count_unread_from(
        &self,
        receiver: &UserId,
        sender: &UserId,
    ) -> Result<u64, DomainError> {
        self.inner.count_unread_from(receiver, sender).await
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<Message>, DomainError> {
        self.inner.history(query).await
    }
}

struct Harness {
    registry: Arc<InMemoryConnectionRegistry>,
    messages: Arc<CountingMessageStore>,
    notifications: Arc<InMemoryNotificationStore>,
    join: JoinConversationHandler,
    send: SendMessageHandler,
    unread: GetUnreadCountHandler,
}

struct Client {
    identity: Identity,
    connection_id: ConnectionId,
    events: UnboundedReceiver<OutboundEvent>,
}

impl Client {
    fn drain(&mut self) -> Vec<OutboundEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

fn uid(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

fn harness(bookings: InMemoryBookingStore) -> Harness {
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let messages = Arc::new(CountingMessageStore {
        inner: InMemoryMessageStore::new(),
        mark_read_calls: AtomicUsize::new(0),
    });
    let notifications = Arc::new(InMemoryNotificationStore::new());
    let authorizer = Arc::new(RelationshipAuthorizer::new(Arc::new(bookings)));
    let fanout = Arc::new(NotificationFanout::new(
        notifications.clone(),
        messages.clone(),
        registry.clone(),
    ));

    Harness {
        join: JoinConversationHandler::new(authorizer.clone(), registry.clone(), messages.clone()),
        send: SendMessageHandler::new(
            authorizer,
            messages.clone(),
            Arc::new(InMemoryConversationStore::new()),
            registry.clone(),
            fanout,
            Arc::new(MonotonicClock::new()),
        ),
        unread: GetUnreadCountHandler::new(messages.clone()),
        registry,
        messages,
        notifications,
    }
}

fn connect(h: &Harness, who: &str, role: Role) -> Client {
    let identity = Identity::new(uid(who), role);
    let (tx, events) = mpsc::unbounded_channel();
    let connection_id = ConnectionId::new();
    h.registry
        .register(connection_id, identity.clone(), tx)
        .unwrap();
    Client {
        identity,
        connection_id,
        events,
    }
}

fn text(sender: &Client, to: &str, content: &str) -> SendMessageCommand {
    SendMessageCommand {
        sender: sender.identity.clone(),
        receiver_id: uid(to),
        content: content.to_string(),
        kind: Some("text".to_string()),
        attachments: vec![],
    }
}

async fn join(h: &Harness, client: &Client, other: &str) -> Result<RoomId, MessagingError> {
    h.join
        .handle(JoinConversationCommand {
            connection_id: client.connection_id,
            other_id: uid(other),
        })
        .await
        .map(|r| r.room_id)
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn booked_pair_hello_reaches_room_and_offline_vendor_gets_notification() {
    let h = harness(InMemoryBookingStore::new().with_booking(uid("u"), uid("v")));
    let mut u = connect(&h, "u", Role::Customer);

    let room = join(&h, &u, "v").await.unwrap();
    assert_eq!(room, RoomId::for_pair(&uid("u"), &uid("v")));

    let result = h.send.handle(text(&u, "v", "Hello")).await.unwrap();
    assert!(result.notified);

    let events = u.drain();
    assert!(events
        .iter()
        .any(|e| matches!(e, OutboundEvent::NewMessage(m) if m.content == "Hello")));

    let stored = h.notifications.for_recipient(&uid("v")).await;
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn vendor_online_elsewhere_gets_live_badge() {
    let h = harness(InMemoryBookingStore::new().with_booking(uid("u"), uid("v")));
    let u = connect(&h, "u", Role::Customer);
    let mut v = connect(&h, "v", Role::Vendor);
    join(&h, &u, "v").await.unwrap();

    h.send.handle(text(&u, "v", "Hello")).await.unwrap();

    let events = v.drain();
    assert_eq!(events.len(), 1);
    match &events[0] {
        OutboundEvent::MessageNotification {
            message,
            unread_count,
        } => {
            assert_eq!(message.content, "Hello");
            assert_eq!(*unread_count, 1);
        }
        other => panic!("expected messageNotification, got {:?}", other),
    }
}

#[tokio::test]
async fn recipient_in_room_gets_no_notification() {
    let h = harness(InMemoryBookingStore::new().with_booking(uid("u"), uid("v")));
    let u = connect(&h, "u", Role::Customer);
    let mut v = connect(&h, "v", Role::Vendor);
    join(&h, &u, "v").await.unwrap();
    join(&h, &v, "u").await.unwrap();
    v.drain();

    let result = h.send.handle(text(&u, "v", "Are you free Saturday?")).await.unwrap();

    assert!(!result.notified);
    assert!(h.notifications.is_empty().await);
    let events = v.drain();
    assert!(matches!(events.as_slice(), [OutboundEvent::NewMessage(_)]));
}

#[tokio::test]
async fn stranger_join_is_denied_without_membership_change() {
    let h = harness(InMemoryBookingStore::new().with_booking(uid("u"), uid("v")));
    let u = connect(&h, "u", Role::Customer);

    let result = join(&h, &u, "w").await;

    assert_eq!(
        result,
        Err(MessagingError::permission_denied(DenialReason::NoBookingRelationship))
    );
    assert!(!h
        .registry
        .is_present_in_room(&uid("u"), &RoomId::for_pair(&uid("u"), &uid("w"))));
}

#[tokio::test]
async fn stranger_send_is_denied_and_nothing_is_stored() {
    let h = harness(InMemoryBookingStore::new());
    let u = connect(&h, "u", Role::Customer);

    for content in ["one", "two", "three"] {
        let result = h.send.handle(text(&u, "w", content)).await;
        assert!(matches!(result, Err(MessagingError::PermissionDenied { .. })));
    }

    assert!(h.messages.inner.is_empty().await);
    assert!(h.notifications.is_empty().await);
}

#[tokio::test]
async fn offline_backlog_is_read_on_join_with_single_mark_read() {
    let h = harness(InMemoryBookingStore::new().with_booking(uid("u"), uid("v")));
    let u = connect(&h, "u", Role::Customer);
    for n in 1..=3 {
        h.send
            .handle(text(&u, "v", &format!("message {}", n)))
            .await
            .unwrap();
    }
    assert_eq!(h.unread.handle(&uid("v")).await.unwrap(), 3);
    assert_eq!(h.notifications.for_recipient(&uid("v")).await.len(), 3);

    let v = connect(&h, "v", Role::Vendor);
    let before_calls = h.messages.mark_read_calls.load(Ordering::SeqCst);
    join(&h, &v, "u").await.unwrap();

    assert_eq!(h.unread.handle(&uid("v")).await.unwrap(), 0);
    assert_eq!(h.messages.mark_read_calls.load(Ordering::SeqCst), before_calls + 1);
}

#[tokio::test]
async fn read_state_is_never_unset_by_later_traffic() {
    let h = harness(InMemoryBookingStore::new().with_booking(uid("u"), uid("v")));
    let u = connect(&h, "u", Role::Customer);
    let v = connect(&h, "v", Role::Vendor);

    h.send.handle(text(&u, "v", "first")).await.unwrap();
    join(&h, &v, "u").await.unwrap();
    h.send.handle(text(&u, "v", "second")).await.unwrap();
    join(&h, &v, "u").await.unwrap();

    let all = h.messages.inner.all_between(&uid("u"), &uid("v")).await;
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|m| m.read_at.is_some()));
}

#[tokio::test]
async fn single_sender_order_is_preserved_for_every_member() {
    let h = harness(InMemoryBookingStore::new().with_booking(uid("u"), uid("v")));
    let mut u = connect(&h, "u", Role::Customer);
    let mut v = connect(&h, "v", Role::Vendor);
    join(&h, &u, "v").await.unwrap();
    join(&h, &v, "u").await.unwrap();
    u.drain();
    v.drain();

    for n in 0..20 {
        h.send.handle(text(&u, "v", &format!("m{}", n))).await.unwrap();
    }

    let expected: Vec<String> = (0..20).map(|n| format!("m{}", n)).collect();
    for client in [&mut u, &mut v] {
        let seen: Vec<String> = client
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                OutboundEvent::NewMessage(m) => Some(m.content),
                _ => None,
            })
            .collect();
        assert_eq!(seen, expected);
    }
}

#[tokio::test]
async fn concurrent_senders_are_observed_in_created_at_order() {
    let h = Arc::new(harness(
        InMemoryBookingStore::new().with_booking(uid("u"), uid("v")),
    ));
    let u = connect(&h, "u", Role::Customer);
    let mut v = connect(&h, "v", Role::Vendor);
    join(&h, &u, "v").await.unwrap();
    join(&h, &v, "u").await.unwrap();
    v.drain();

    let mut tasks = Vec::new();
    for n in 0..10 {
        let h = h.clone();
        let sender = if n % 2 == 0 {
            u.identity.clone()
        } else {
            v.identity.clone()
        };
        let to = if n % 2 == 0 { "v" } else { "u" };
        tasks.push(tokio::spawn(async move {
            h.send
                .handle(SendMessageCommand {
                    sender,
                    receiver_id: uid(to),
                    content: format!("c{}", n),
                    kind: None,
                    attachments: vec![],
                })
                .await
                .unwrap()
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let stamps: Vec<Timestamp> = v
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            OutboundEvent::NewMessage(m) => Some(m.created_at),
            _ => None,
        })
        .collect();
    assert_eq!(stamps.len(), 10);
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
}
