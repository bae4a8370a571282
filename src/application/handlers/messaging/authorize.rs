//! RelationshipAuthorizer - may these two identities message each other?

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::messaging::{DenialReason, MessagingError};
use crate::ports::BookingRelationshipReader;

/// Answers whether a messaging channel between two identities is permitted.
///
/// Side-effect free and never cached: every join and every send asks again.
pub struct RelationshipAuthorizer {
    bookings: Arc<dyn BookingRelationshipReader>,
}

impl RelationshipAuthorizer {
    pub fn new(bookings: Arc<dyn BookingRelationshipReader>) -> Self {
        Self { bookings }
    }

    /// True if a booking has ever linked `a` and `b`.
    pub async fn can_message(&self, a: &UserId, b: &UserId) -> Result<bool, DomainError> {
        if a == b {
            return Ok(false);
        }
        self.bookings.exists_relationship(a, b).await
    }

    /// Like `can_message`, but maps the outcome onto the messaging taxonomy.
    ///
    /// A store failure is `StorageUnavailable`, never an implicit allow.
    pub async fn ensure_can_message(&self, a: &UserId, b: &UserId) -> Result<(), MessagingError> {
        if a == b {
            return Err(MessagingError::permission_denied(DenialReason::SelfConversation));
        }

        match self.bookings.exists_relationship(a, b).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MessagingError::permission_denied(
                DenialReason::NoBookingRelationship,
            )),
            Err(e) => {
                tracing::error!(user_a = %a, user_b = %b, error = %e, "Relationship lookup failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBookings {
        answer: Result<bool, DomainError>,
        calls: AtomicUsize,
    }

    impl FixedBookings {
        fn new(answer: Result<bool, DomainError>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BookingRelationshipReader for FixedBookings {
        async fn exists_relationship(&self, _a: &UserId, _b: &UserId) -> Result<bool, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[tokio::test]
    async fn allows_pair_with_booking() {
        let authorizer = RelationshipAuthorizer::new(Arc::new(FixedBookings::new(Ok(true))));
        assert!(authorizer.can_message(&uid("c"), &uid("v")).await.unwrap());
        assert!(authorizer.ensure_can_message(&uid("c"), &uid("v")).await.is_ok());
    }

    #[tokio::test]
    async fn denies_pair_without_booking() {
        let authorizer = RelationshipAuthorizer::new(Arc::new(FixedBookings::new(Ok(false))));
        assert_eq!(
            authorizer.ensure_can_message(&uid("c"), &uid("w")).await,
            Err(MessagingError::permission_denied(DenialReason::NoBookingRelationship))
        );
    }

    #[tokio::test]
    async fn self_conversation_is_denied_without_store_lookup() {
        let bookings = Arc::new(FixedBookings::new(Ok(true)));
        let authorizer = RelationshipAuthorizer::new(bookings.clone());

        assert!(!authorizer.can_message(&uid("c"), &uid("c")).await.unwrap());
        assert_eq!(
            authorizer.ensure_can_message(&uid("c"), &uid("c")).await,
            Err(MessagingError::permission_denied(DenialReason::SelfConversation))
        );
        assert_eq!(bookings.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_failure_fails_closed() {
        let authorizer = RelationshipAuthorizer::new(Arc::new(FixedBookings::new(Err(
            DomainError::database("bookings unreachable"),
        ))));

        let result = authorizer.ensure_can_message(&uid("c"), &uid("v")).await;
        assert!(matches!(result, Err(MessagingError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn every_call_reaches_the_store() {
        let bookings = Arc::new(FixedBookings::new(Ok(true)));
        let authorizer = RelationshipAuthorizer::new(bookings.clone());

        for _ in 0..3 {
            authorizer.ensure_can_message(&uid("c"), &uid("v")).await.unwrap();
        }
        assert_eq!(bookings.calls.load(Ordering::SeqCst), 3);
    }
}
