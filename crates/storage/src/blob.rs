//! JSON encoding of the persisted blobs shared by every backend.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::StorageError;

/// Key of the user preferences blob.
pub const SETTINGS_KEY: &str = "examSettings";

/// Key of the exam store snapshot (configuration and result history).
pub const SNAPSHOT_KEY: &str = "exam-storage";

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|err| StorageError::Serialization(err.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw)
        .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))
}
