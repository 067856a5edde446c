use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{ProgressRecord, ProgressRepository, StorageError};

use super::SqliteRepository;

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(&self, key: &str) -> Result<Option<ProgressRecord>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        ProgressRecord::from_json(&value).map(Some)
    }

    async fn save_progress(&self, key: &str, record: &ProgressRecord) -> Result<(), StorageError> {
        let encoded = record.to_json()?;
        sqlx::query(
            r"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(encoded)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
