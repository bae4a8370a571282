//! PostgreSQL implementation of MessageRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, MessageId, Timestamp, UserId};
use crate::domain::messaging::{Attachment, Message, MessageKind};
use crate::ports::{HistoryQuery, MessageRepository};

use super::database_error;

const MESSAGE_COLUMNS: &str =
    "id, sender_id, receiver_id, content, kind, attachments, created_at, read_at";

/// PostgreSQL implementation of MessageRepository.
#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn append(&self, message: Message) -> Result<Message, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, sender_id, receiver_id, content, kind, attachments, created_at, read_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.sender_id.as_str())
        .bind(message.receiver_id.as_str())
        .bind(&message.content)
        .bind(message.kind.as_str())
        .bind(Json(&message.attachments))
        .bind(message.created_at.as_datetime())
        .bind(message.read_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("insert message", e))?;

        Ok(message)
    }

    async fn mark_read(
        &self,
        receiver: &UserId,
        sender: &UserId,
        at: Timestamp,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET read_at = $3
            WHERE receiver_id = $1 AND sender_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(receiver.as_str())
        .bind(sender.as_str())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("mark messages read", e))?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND read_at IS NULL",
        )
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("count unread messages", e))?;

        Ok(count.max(0) as u64)
    }

    async fn count_unread_from(
        &self,
        receiver: &UserId,
        sender: &UserId,
    ) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE receiver_id = $1 AND sender_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(receiver.as_str())
        .bind(sender.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("count unread messages", e))?;

        Ok(count.max(0) as u64)
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<Message>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM messages
            WHERE ((sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1))
              AND ($3::timestamptz IS NULL OR created_at < $3)
            ORDER BY created_at DESC
            LIMIT $4
            "#,
            MESSAGE_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(query.a.as_str())
            .bind(query.b.as_str())
            .bind(query.before.map(|t| *t.as_datetime()))
            .bind(i64::from(query.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("fetch message history", e))?;

        let mut messages = rows.iter().map(row_to_message).collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }
}

fn row_to_message(row: &PgRow) -> Result<Message, DomainError> {
    let decode = |e: sqlx::Error| database_error("decode message row", e);

    let id: uuid::Uuid = row.try_get("id").map_err(decode)?;
    let sender: String = row.try_get("sender_id").map_err(decode)?;
    let receiver: String = row.try_get("receiver_id").map_err(decode)?;
    let kind: String = row.try_get("kind").map_err(decode)?;
    let Json(attachments): Json<Vec<Attachment>> = row.try_get("attachments").map_err(decode)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;
    let read_at: Option<DateTime<Utc>> = row.try_get("read_at").map_err(decode)?;

    let corrupt = |e: crate::domain::foundation::ValidationError| {
        DomainError::new(ErrorCode::DatabaseError, format!("Corrupt message row: {}", e))
    };

    Ok(Message {
        id: MessageId::from_uuid(id),
        sender_id: UserId::new(sender).map_err(corrupt)?,
        receiver_id: UserId::new(receiver).map_err(corrupt)?,
        content: row.try_get("content").map_err(decode)?,
        kind: kind.parse::<MessageKind>().map_err(corrupt)?,
        attachments,
        created_at: Timestamp::from_datetime(created_at),
        read_at: read_at.map(Timestamp::from_datetime),
    })
}
