#![forbid(unsafe_code)]

mod blob;
pub mod repository;
pub mod sqlite;

pub use blob::{SETTINGS_KEY, SNAPSHOT_KEY};
pub use repository::{
    InMemoryRepository, PreferencesRepository, SnapshotRepository, Storage, StorageError,
};
