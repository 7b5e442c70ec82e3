use std::sync::Arc;

use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::preferences_service::PreferencesService;
use crate::snapshot_service::SnapshotService;

/// Assembles the persistence-facing services for the app.
#[derive(Clone)]
pub struct ExamServices {
    preferences: Arc<PreferencesService>,
    snapshots: Arc<SnapshotService>,
}

impl ExamServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage))
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_storage(&Storage::in_memory())
    }

    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        Self {
            preferences: Arc::new(PreferencesService::new(Arc::clone(&storage.preferences))),
            snapshots: Arc::new(SnapshotService::new(Arc::clone(&storage.snapshots))),
        }
    }

    #[must_use]
    pub fn preferences(&self) -> Arc<PreferencesService> {
        Arc::clone(&self.preferences)
    }

    #[must_use]
    pub fn snapshots(&self) -> Arc<SnapshotService> {
        Arc::clone(&self.snapshots)
    }
}
