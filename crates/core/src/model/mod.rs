mod config;
mod ids;
mod question;
mod results;
mod snapshot;
pub mod stats;

pub use config::{
    ConfigParseError, DEFAULT_TIMER_MINUTES, ExamConfig, ExamConfigDraft, ExamMode,
    ExamPreferences, QuestionTypeFilter, RcQuestionOrder, TimerMode,
};
pub use ids::{ParseIdError, QuestionNumber, ResultId};
pub use question::{Question, QuestionError, QuestionRecord, QuestionType};
pub use results::{ExamResults, QuestionResult, ResultsError};
pub use snapshot::ExamSnapshot;
pub use stats::{AnswerMap, DeferMap, QuestionStats, ReviewFilter, SectionStats};
