//! Read access to the `telegram_users` table.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::user::UserRecord;
use crate::persistence::Database;
use crate::Result;

/// Repository over the ERP user registry. Cheap to clone.
#[derive(Clone)]
pub struct UserRepo {
    pool: Arc<Database>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    telegram_id: Option<String>,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    is_active: i64,
    bot_enabled: i64,
    role: Option<String>,
    created_at: String,
}

impl UserRow {
    fn into_record(self) -> UserRecord {
        UserRecord {
            id: self.id,
            telegram_id: self.telegram_id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: self.is_active != 0,
            bot_enabled: self.bot_enabled != 0,
            role: self.role,
            created_at: parse_timestamp(self.created_at),
        }
    }
}

fn parse_timestamp(raw: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&raw).map_or_else(
        |err| {
            warn!(%raw, %err, "unparseable created_at, substituting now");
            Utc::now()
        },
        |dt| dt.with_timezone(&Utc),
    )
}

impl UserRepo {
    /// Create a repository over the given pool.
    #[must_use]
    pub fn new(pool: Arc<Database>) -> Self {
        Self { pool }
    }

    /// Find a registered user matching either a chat identifier or a
    /// username.
    ///
    /// Registration may predate the first contact, in which case only the
    /// username is linked; hence the OR. When both identifiers match
    /// different rows the lowest primary key wins.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` on query failure.
    pub async fn find_by_chat_or_username(
        &self,
        chat_id: &str,
        username: &str,
    ) -> Result<Option<UserRecord>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, telegram_id, username, first_name, last_name,
                    is_active, bot_enabled, role, created_at
             FROM telegram_users
             WHERE telegram_id = ?1 OR username = ?2
             ORDER BY id
             LIMIT 1",
        )
        .bind(chat_id)
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(row.map(UserRow::into_record))
    }

    /// Link a chat identifier to a user registered by username only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` on query failure.
    pub async fn link_chat_id(&self, user_id: i64, chat_id: &str) -> Result<()> {
        sqlx::query("UPDATE telegram_users SET telegram_id = ?1 WHERE id = ?2 AND telegram_id IS NULL")
            .bind(chat_id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
