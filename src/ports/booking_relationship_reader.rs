//! Booking existence port.
//!
//! The booking lifecycle lives in another service. Messaging only needs to
//! know whether a booking has ever linked two identities as customer and
//! vendor, in either direction.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Read-only query over the booking store.
///
/// Called on every join and every send; implementations must not cache
/// results beyond a single call, since bookings can be revoked out-of-band.
#[async_trait]
pub trait BookingRelationshipReader: Send + Sync {
    /// True if any booking (any status) links `a` and `b` as customer/vendor.
    async fn exists_relationship(&self, a: &UserId, b: &UserId) -> Result<bool, DomainError>;
}
