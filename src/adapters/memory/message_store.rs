//! In-memory message store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::messaging::{Message, RoomId};
use crate::ports::{HistoryQuery, MessageRepository};

/// Append-only message log kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }

    /// Every stored message of the pair, oldest first.
    pub async fn all_between(&self, a: &UserId, b: &UserId) -> Vec<Message> {
        let room = RoomId::for_pair(a, b);
        let mut list: Vec<_> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.room_id() == room)
            .cloned()
            .collect();
        list.sort_by(|x, y| x.created_at.cmp(&y.created_at));
        list
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageStore {
    async fn append(&self, message: Message) -> Result<Message, DomainError> {
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn mark_read(
        &self,
        receiver: &UserId,
        sender: &UserId,
        at: Timestamp,
    ) -> Result<u64, DomainError> {
        let mut messages = self.messages.write().await;
        let mut marked = 0u64;
        for message in messages
            .iter_mut()
            .filter(|m| &m.receiver_id == receiver && &m.sender_id == sender)
        {
            if message.mark_read(at) {
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let count = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| &m.receiver_id == user_id && m.is_unread())
            .count();
        Ok(count as u64)
    }

    async fn count_unread_from(
        &self,
        receiver: &UserId,
        sender: &UserId,
    ) -> Result<u64, DomainError> {
        let count = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| &m.receiver_id == receiver && &m.sender_id == sender && m.is_unread())
            .count();
        Ok(count as u64)
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<Message>, DomainError> {
        let mut page: Vec<_> = self
            .all_between(&query.a, &query.b)
            .await
            .into_iter()
            .filter(|m| query.before.map_or(true, |before| m.created_at < before))
            .collect();

        let limit = query.limit as usize;
        if page.len() > limit {
            page.drain(..page.len() - limit);
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::MonotonicClock;
    use crate::domain::messaging::{MessageDraft, MessageLimits};

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    async fn send(store: &InMemoryMessageStore, clock: &MonotonicClock, from: &str, to: &str) {
        let validated = MessageDraft {
            sender_id: uid(from),
            receiver_id: uid(to),
            content: format!("{} to {}", from, to),
            kind: None,
            attachments: vec![],
        }
        .validate(&MessageLimits::default())
        .unwrap();
        store
            .append(Message::from_validated(validated, clock.tick()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn mark_read_only_touches_one_direction_and_is_idempotent() {
        let store = InMemoryMessageStore::new();
        let clock = MonotonicClock::new();
        send(&store, &clock, "vend", "cust").await;
        send(&store, &clock, "vend", "cust").await;
        send(&store, &clock, "cust", "vend").await;

        let at = Timestamp::now();
        assert_eq!(store.mark_read(&uid("cust"), &uid("vend"), at).await.unwrap(), 2);
        assert_eq!(store.mark_read(&uid("cust"), &uid("vend"), at).await.unwrap(), 0);
        assert_eq!(store.count_unread(&uid("cust")).await.unwrap(), 0);
        assert_eq!(store.count_unread(&uid("vend")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn count_unread_from_is_per_sender() {
        let store = InMemoryMessageStore::new();
        let clock = MonotonicClock::new();
        send(&store, &clock, "vend-a", "cust").await;
        send(&store, &clock, "vend-b", "cust").await;
        send(&store, &clock, "vend-b", "cust").await;

        assert_eq!(store.count_unread(&uid("cust")).await.unwrap(), 3);
        assert_eq!(
            store.count_unread_from(&uid("cust"), &uid("vend-b")).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn history_pages_backwards_with_before() {
        let store = InMemoryMessageStore::new();
        let clock = MonotonicClock::new();
        for _ in 0..4 {
            send(&store, &clock, "cust", "vend").await;
        }
        send(&store, &clock, "cust", "someone-else").await;

        let all = store.all_between(&uid("vend"), &uid("cust")).await;
        assert_eq!(all.len(), 4);

        let page = store
            .history(&HistoryQuery {
                a: uid("vend"),
                b: uid("cust"),
                before: Some(all[3].created_at),
                limit: 2,
            })
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, all[1].id);
        assert_eq!(page[1].id, all[2].id);
    }
}
