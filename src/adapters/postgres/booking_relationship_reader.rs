//! PostgreSQL implementation of BookingRelationshipReader.
//!
//! Reads the platform's `bookings` table. Any row, whatever its status,
//! links the pair.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::BookingRelationshipReader;

use super::database_error;

#[derive(Clone)]
pub struct PostgresBookingRelationshipReader {
    pool: PgPool,
}

impl PostgresBookingRelationshipReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRelationshipReader for PostgresBookingRelationshipReader {
    async fn exists_relationship(&self, a: &UserId, b: &UserId) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE (customer_id = $1 AND vendor_id = $2)
                   OR (customer_id = $2 AND vendor_id = $1)
            )
            "#,
        )
        .bind(a.as_str())
        .bind(b.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("check booking relationship", e))?;

        Ok(exists)
    }
}
