use std::sync::Arc;

use exam_core::model::ExamPreferences;
use storage::repository::{PreferencesRepository, StorageError};
use tracing::warn;

use crate::error::PreferencesServiceError;

#[derive(Clone)]
pub struct PreferencesService {
    repo: Arc<dyn PreferencesRepository>,
}

impl PreferencesService {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferencesRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted preferences, or defaults if none were saved.
    ///
    /// A corrupt blob is logged and treated as missing.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesServiceError` if the storage backend fails.
    pub async fn load(&self) -> Result<ExamPreferences, PreferencesServiceError> {
        match self.repo.get_preferences().await {
            Ok(prefs) => Ok(prefs.unwrap_or_default()),
            Err(StorageError::Serialization(reason)) => {
                warn!(%reason, "stored preferences are unreadable, using defaults");
                Ok(ExamPreferences::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Persist `prefs`, replacing the previous blob.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesServiceError` if persistence fails.
    pub async fn save(&self, prefs: &ExamPreferences) -> Result<(), PreferencesServiceError> {
        self.repo.save_preferences(prefs).await?;
        Ok(())
    }
}
