//! PostgreSQL implementation of ConversationRepository over `chat_sessions`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::messaging::{ConversationSummary, RoomId};
use crate::ports::ConversationRepository;

use super::database_error;

/// Conflicts on the participant pair, never on the joined room key, which
/// is ambiguous when ids contain `_`. GREATEST keeps `last_message_at` from
/// moving backwards under races.
const UPSERT_CHAT_SESSION: &str = r#"
    INSERT INTO chat_sessions (user_low, user_high, room_key, last_message_at, active)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (user_low, user_high) DO UPDATE SET
        last_message_at = GREATEST(chat_sessions.last_message_at, EXCLUDED.last_message_at),
        active = EXCLUDED.active
"#;

/// One `chat_sessions` row per unordered pair.
#[derive(Clone)]
pub struct PostgresChatSessionRepository {
    pool: PgPool,
}

impl PostgresChatSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PostgresChatSessionRepository {
    async fn upsert(&self, summary: &ConversationSummary) -> Result<(), DomainError> {
        let (low, high) = summary.participants();

        sqlx::query(UPSERT_CHAT_SESSION)
            .bind(low.as_str())
            .bind(high.as_str())
            .bind(summary.room_id.key())
            .bind(summary.last_message_at.as_datetime())
            .bind(summary.active)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("upsert chat session", e))?;

        Ok(())
    }

    async fn list_for_identity(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT user_low, user_high, last_message_at, active
            FROM chat_sessions
            WHERE user_low = $1 OR user_high = $1
            ORDER BY last_message_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list chat sessions", e))?;

        rows.iter()
            .map(|row| {
                let decode = |e: sqlx::Error| database_error("decode chat session row", e);
                let low: String = row.try_get("user_low").map_err(decode)?;
                let high: String = row.try_get("user_high").map_err(decode)?;
                let last: DateTime<Utc> = row.try_get("last_message_at").map_err(decode)?;

                let (low, high) = match (UserId::new(low), UserId::new(high)) {
                    (Ok(low), Ok(high)) => (low, high),
                    _ => {
                        return Err(DomainError::new(
                            ErrorCode::DatabaseError,
                            "Corrupt chat session row: empty participant",
                        ))
                    }
                };

                Ok(ConversationSummary {
                    room_id: RoomId::for_pair(&low, &high),
                    last_message_at: Timestamp::from_datetime(last),
                    active: row.try_get("active").map_err(decode)?,
                })
            })
            .collect()
    }
}
