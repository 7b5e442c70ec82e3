use std::sync::Arc;

use exam_core::model::ExamSnapshot;
use storage::repository::{SnapshotRepository, StorageError};
use tracing::{debug, warn};

use crate::error::SnapshotServiceError;
use crate::exam::ExamStore;

/// Loads and saves the persisted part of an `ExamStore`.
#[derive(Clone)]
pub struct SnapshotService {
    repo: Arc<dyn SnapshotRepository>,
}

impl SnapshotService {
    #[must_use]
    pub fn new(repo: Arc<dyn SnapshotRepository>) -> Self {
        Self { repo }
    }

    /// Load the stored snapshot, or an empty one if none was saved.
    ///
    /// A corrupt blob is logged and treated as missing. Invalid history
    /// entries are logged and skipped while the rest are kept.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotServiceError` if the storage backend fails.
    pub async fn load(&self) -> Result<ExamSnapshot, SnapshotServiceError> {
        match self.repo.get_snapshot().await {
            Ok(Some(snapshot)) => {
                if snapshot.discarded_results > 0 {
                    warn!(
                        discarded = snapshot.discarded_results,
                        kept = snapshot.result_history.len(),
                        "dropped unreadable exam results from history"
                    );
                }
                Ok(snapshot)
            }
            Ok(None) => Ok(ExamSnapshot::default()),
            Err(StorageError::Serialization(reason)) => {
                warn!(%reason, "stored exam snapshot is unreadable, starting empty");
                Ok(ExamSnapshot::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Restore `store` from the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotServiceError` if the storage backend fails.
    pub async fn restore_into(&self, store: &mut ExamStore) -> Result<(), SnapshotServiceError> {
        let snapshot = self.load().await?;
        debug!(history = snapshot.result_history.len(), "restoring exam store");
        store.restore(snapshot);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SnapshotServiceError` if persistence fails.
    pub async fn save(&self, snapshot: &ExamSnapshot) -> Result<(), SnapshotServiceError> {
        self.repo.save_snapshot(snapshot).await?;
        Ok(())
    }

    /// Save the store's snapshot if it changed since the last save.
    ///
    /// Returns `true` when a write happened.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotServiceError` if persistence fails; the store stays
    /// marked as unsaved.
    pub async fn persist_if_dirty(
        &self,
        store: &mut ExamStore,
    ) -> Result<bool, SnapshotServiceError> {
        if !store.has_unsaved_changes() {
            return Ok(false);
        }
        self.save(&store.snapshot()).await?;
        store.mark_saved();
        debug!("exam snapshot persisted");
        Ok(true)
    }
}
