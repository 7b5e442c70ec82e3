//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use exam_core::model::QuestionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by a `QuestionSource`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question source unavailable: {0}")]
    Unavailable(String),
}

/// Exam initialization failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    #[error("failed to generate exam questions: no questions matched the configuration")]
    NoQuestions,
    #[error(transparent)]
    Source(#[from] QuestionSourceError),
    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),
}

/// Errors emitted by `PreferencesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreferencesServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SnapshotService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping exam services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
