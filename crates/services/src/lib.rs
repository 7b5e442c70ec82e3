#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod exam;
pub mod preferences_service;
pub mod snapshot_service;
pub mod source;

pub use exam_core::Clock;

pub use app_services::ExamServices;
pub use error::{
    AppServicesError, ExamError, PreferencesServiceError, QuestionSourceError,
    SnapshotServiceError,
};
pub use exam::{ExamInfo, ExamStore, ExamView, ManualTicks, Tick, TickGuard, TickSource, TokioTicks};
pub use preferences_service::PreferencesService;
pub use snapshot_service::SnapshotService;
pub use source::{QuestionBank, QuestionSource};
