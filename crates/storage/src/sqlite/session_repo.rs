use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tutor_core::model::SessionKey;

use super::SqliteRepository;
use crate::repository::{SessionRecord, SessionStore, StorageError};

#[async_trait]
impl SessionStore for SqliteRepository {
    async fn load(&self, key: &SessionKey) -> Result<Option<SessionRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT value
            FROM chat_sessions
            WHERE session_key = ?1
            ",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        SessionRecord::from_json(&value).map(Some)
    }

    async fn save(&self, key: &SessionKey, record: &SessionRecord) -> Result<(), StorageError> {
        let value = record.to_json()?;
        let res = sqlx::query(
            r"
            INSERT INTO chat_sessions (session_key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(session_key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            WHERE chat_sessions.value <> excluded.value
            ",
        )
        .bind(key.as_str())
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        if res.rows_affected() == 0 {
            tracing::trace!(key = %key, "session unchanged, skipped write");
        }
        Ok(())
    }
}
