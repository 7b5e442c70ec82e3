use async_trait::async_trait;
use exam_core::model::{ExamPreferences, ExamSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::blob::{self, SETTINGS_KEY, SNAPSHOT_KEY};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the user preferences blob.
#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    /// Fetch stored preferences, if any were saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored blob is corrupt, or
    /// other storage errors.
    async fn get_preferences(&self) -> Result<Option<ExamPreferences>, StorageError>;

    /// Replace the stored preferences.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the blob cannot be stored.
    async fn save_preferences(&self, prefs: &ExamPreferences) -> Result<(), StorageError>;
}

/// Repository contract for the exam store snapshot.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the stored snapshot, if any was saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored blob is corrupt, or
    /// other storage errors.
    async fn get_snapshot(&self) -> Result<Option<ExamSnapshot>, StorageError>;

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the blob cannot be stored.
    async fn save_snapshot(&self, snapshot: &ExamSnapshot) -> Result<(), StorageError>;
}

/// In-memory key-value repository for testing and prototyping.
///
/// Blobs are kept as JSON text so the same encoding path as the `SQLite`
/// backend is exercised.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under `key`, bypassing encoding.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn put_raw(&self, key: &str, raw: impl Into<String>) -> Result<(), StorageError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), raw.into());
        Ok(())
    }

    /// Read raw text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }
}

#[async_trait]
impl PreferencesRepository for InMemoryRepository {
    async fn get_preferences(&self) -> Result<Option<ExamPreferences>, StorageError> {
        self.get_raw(SETTINGS_KEY)?
            .map(|raw| blob::decode(SETTINGS_KEY, &raw))
            .transpose()
    }

    async fn save_preferences(&self, prefs: &ExamPreferences) -> Result<(), StorageError> {
        self.put_raw(SETTINGS_KEY, blob::encode(prefs)?)
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn get_snapshot(&self) -> Result<Option<ExamSnapshot>, StorageError> {
        self.get_raw(SNAPSHOT_KEY)?
            .map(|raw| blob::decode(SNAPSHOT_KEY, &raw))
            .transpose()
    }

    async fn save_snapshot(&self, snapshot: &ExamSnapshot) -> Result<(), StorageError> {
        self.put_raw(SNAPSHOT_KEY, blob::encode(snapshot)?)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub preferences: Arc<dyn PreferencesRepository>,
    pub snapshots: Arc<dyn SnapshotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let preferences: Arc<dyn PreferencesRepository> = Arc::new(repo.clone());
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(repo);
        Self {
            preferences,
            snapshots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{ExamMode, QuestionType, QuestionTypeFilter, TimerMode};

    #[tokio::test]
    async fn preferences_round_trip() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_preferences().await.unwrap().is_none());

        let prefs = ExamPreferences {
            exam_mode: ExamMode::Single,
            timer_mode: TimerMode::Total,
            selected_timer_duration: 30,
            question_type_filter: QuestionTypeFilter::Specific,
            selected_question_type: QuestionType::OddOneOut,
            ..ExamPreferences::default()
        };
        repo.save_preferences(&prefs).await.unwrap();

        let fetched = repo.get_preferences().await.unwrap();
        assert_eq!(fetched, Some(prefs));

        let raw = repo.get_raw(SETTINGS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"selectedTimerDuration\":30"));
    }

    #[tokio::test]
    async fn corrupt_blob_surfaces_serialization_error() {
        let repo = InMemoryRepository::new();
        repo.put_raw(SNAPSHOT_KEY, "{not json").unwrap();

        let err = repo.get_snapshot().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn blobs_are_kept_under_separate_keys() {
        let repo = InMemoryRepository::new();
        repo.save_preferences(&ExamPreferences::default())
            .await
            .unwrap();
        assert!(repo.get_snapshot().await.unwrap().is_none());

        repo.save_snapshot(&ExamSnapshot::default()).await.unwrap();
        assert!(repo.get_raw(SNAPSHOT_KEY).unwrap().is_some());
    }
}
