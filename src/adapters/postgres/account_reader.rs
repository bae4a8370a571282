//! PostgreSQL implementation of AccountReader over the platform's `users` table.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{AccountRecord, AuthError, Identity, Role, UserId};
use crate::ports::AccountReader;

#[derive(Clone)]
pub struct PostgresAccountReader {
    pool: PgPool,
}

impl PostgresAccountReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountReader for PostgresAccountReader {
    async fn get_account(&self, user_id: &UserId) -> Result<AccountRecord, AuthError> {
        let row = sqlx::query(
            "SELECT role, display_name, is_active FROM users WHERE id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::service_unavailable(format!("Failed to fetch account: {}", e)))?
        .ok_or(AuthError::UserNotFound)?;

        let decode =
            |e: sqlx::Error| AuthError::service_unavailable(format!("Corrupt account row: {}", e));
        let role: String = row.try_get("role").map_err(decode)?;
        let display_name: Option<String> = row.try_get("display_name").map_err(decode)?;
        let active: bool = row.try_get("is_active").map_err(decode)?;

        let role = role
            .parse::<Role>()
            .map_err(|e| AuthError::service_unavailable(format!("Corrupt account row: {}", e)))?;

        let mut identity = Identity::new(user_id.clone(), role);
        if let Some(name) = display_name.filter(|n| !n.trim().is_empty()) {
            identity = identity.with_display_name(name);
        }

        Ok(AccountRecord { identity, active })
    }
}
