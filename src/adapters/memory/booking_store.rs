//! In-memory booking relationships.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::messaging::RoomId;
use crate::ports::BookingRelationshipReader;

/// Set of identity pairs that share at least one booking.
///
/// Pairs are stored unordered, so a customer/vendor booking answers for
/// both directions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingStore {
    pairs: Arc<RwLock<HashSet<RoomId>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `add_booking` for fixtures.
    pub fn with_booking(self, customer: UserId, vendor: UserId) -> Self {
        if let Ok(mut pairs) = self.pairs.try_write() {
            pairs.insert(RoomId::for_pair(&customer, &vendor));
        }
        self
    }

    pub async fn add_booking(&self, customer: &UserId, vendor: &UserId) {
        self.pairs
            .write()
            .await
            .insert(RoomId::for_pair(customer, vendor));
    }

    /// Removes the relationship, as an out-of-band revocation would.
    pub async fn remove_booking(&self, a: &UserId, b: &UserId) {
        self.pairs.write().await.remove(&RoomId::for_pair(a, b));
    }
}

#[async_trait]
impl BookingRelationshipReader for InMemoryBookingStore {
    async fn exists_relationship(&self, a: &UserId, b: &UserId) -> Result<bool, DomainError> {
        Ok(self.pairs.read().await.contains(&RoomId::for_pair(a, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[tokio::test]
    async fn relationship_is_symmetric() {
        let store = InMemoryBookingStore::new().with_booking(uid("cust"), uid("vend"));

        assert!(store.exists_relationship(&uid("cust"), &uid("vend")).await.unwrap());
        assert!(store.exists_relationship(&uid("vend"), &uid("cust")).await.unwrap());
        assert!(!store.exists_relationship(&uid("cust"), &uid("other")).await.unwrap());
    }

    #[tokio::test]
    async fn removed_booking_no_longer_counts() {
        let store = InMemoryBookingStore::new();
        store.add_booking(&uid("cust"), &uid("vend")).await;
        store.remove_booking(&uid("vend"), &uid("cust")).await;

        assert!(!store.exists_relationship(&uid("cust"), &uid("vend")).await.unwrap());
    }
}
