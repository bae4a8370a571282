//! In-memory notifications.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::messaging::Notification;
use crate::ports::NotificationRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationStore {
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored notifications for one recipient, oldest first.
    pub async fn for_recipient(&self, user_id: &UserId) -> Vec<Notification> {
        self.notifications
            .read()
            .await
            .iter()
            .filter(|n| &n.recipient_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.notifications.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notifications.read().await.is_empty()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationStore {
    async fn create(&self, notification: Notification) -> Result<Notification, DomainError> {
        self.notifications.write().await.push(notification.clone());
        Ok(notification)
    }
}
