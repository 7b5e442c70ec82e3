use async_trait::async_trait;
use chrono::Utc;
use exam_core::model::{ExamPreferences, ExamSnapshot};
use sqlx::Row;

use crate::blob::{self, SETTINGS_KEY, SNAPSHOT_KEY};
use crate::repository::{PreferencesRepository, SnapshotRepository, StorageError};

use super::SqliteRepository;

impl SqliteRepository {
    async fn get_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_blobs WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|err| StorageError::Serialization(err.to_string()))
        })
        .transpose()
    }

    async fn put_blob(&self, key: &str, value: String) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO kv_blobs (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl PreferencesRepository for SqliteRepository {
    async fn get_preferences(&self) -> Result<Option<ExamPreferences>, StorageError> {
        self.get_blob(SETTINGS_KEY)
            .await?
            .map(|raw| blob::decode(SETTINGS_KEY, &raw))
            .transpose()
    }

    async fn save_preferences(&self, prefs: &ExamPreferences) -> Result<(), StorageError> {
        self.put_blob(SETTINGS_KEY, blob::encode(prefs)?).await
    }
}

#[async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn get_snapshot(&self) -> Result<Option<ExamSnapshot>, StorageError> {
        self.get_blob(SNAPSHOT_KEY)
            .await?
            .map(|raw| blob::decode(SNAPSHOT_KEY, &raw))
            .transpose()
    }

    async fn save_snapshot(&self, snapshot: &ExamSnapshot) -> Result<(), StorageError> {
        self.put_blob(SNAPSHOT_KEY, blob::encode(snapshot)?).await
    }
}
