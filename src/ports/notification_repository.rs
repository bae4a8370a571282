//! Notification store port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::messaging::Notification;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persists a new notification and returns it as stored.
    async fn create(&self, notification: Notification) -> Result<Notification, DomainError>;
}
