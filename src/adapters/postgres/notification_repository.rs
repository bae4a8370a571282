//! PostgreSQL implementation of NotificationRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::domain::messaging::Notification;
use crate::ports::NotificationRepository;

use super::database_error;

#[derive(Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn create(&self, notification: Notification) -> Result<Notification, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, title, body, kind, created_at, read_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(notification.id.as_uuid())
        .bind(notification.recipient_id.as_str())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.kind.as_str())
        .bind(notification.created_at.as_datetime())
        .bind(notification.read_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("insert notification", e))?;

        Ok(notification)
    }
}
