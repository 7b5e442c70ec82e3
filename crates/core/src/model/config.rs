use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::QuestionType;

/// Timer length used when none (or zero) is configured.
pub const DEFAULT_TIMER_MINUTES: u32 = 13;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {field} value: {raw}")]
pub struct ConfigParseError {
    field: &'static str,
    raw: String,
}

impl ConfigParseError {
    pub(crate) fn new(field: &'static str, raw: &str) -> Self {
        Self {
            field,
            raw: raw.to_owned(),
        }
    }
}

/// Whether section boundaries trigger a review checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamMode {
    #[default]
    Sectioned,
    Single,
}

/// Whether a countdown governs the whole exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    #[default]
    None,
    Total,
}

/// Whether reading-comprehension questions of one passage stay contiguous.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RcQuestionOrder {
    #[default]
    Sequential,
    Random,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionTypeFilter {
    #[default]
    All,
    Specific,
}

impl ExamMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExamMode::Sectioned => "sectioned",
            ExamMode::Single => "single",
        }
    }
}

impl TimerMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::None => "none",
            TimerMode::Total => "total",
        }
    }
}

impl RcQuestionOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RcQuestionOrder::Sequential => "sequential",
            RcQuestionOrder::Random => "random",
        }
    }
}

impl QuestionTypeFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionTypeFilter::All => "all",
            QuestionTypeFilter::Specific => "specific",
        }
    }
}

impl FromStr for ExamMode {
    type Err = ConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sectioned" => Ok(Self::Sectioned),
            "single" => Ok(Self::Single),
            other => Err(ConfigParseError::new("exam mode", other)),
        }
    }
}

impl FromStr for TimerMode {
    type Err = ConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(Self::None),
            "total" => Ok(Self::Total),
            other => Err(ConfigParseError::new("timer mode", other)),
        }
    }
}

impl FromStr for RcQuestionOrder {
    type Err = ConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sequential" => Ok(Self::Sequential),
            "random" => Ok(Self::Random),
            other => Err(ConfigParseError::new("rc question order", other)),
        }
    }
}

impl FromStr for QuestionTypeFilter {
    type Err = ConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(Self::All),
            "specific" => Ok(Self::Specific),
            other => Err(ConfigParseError::new("question type filter", other)),
        }
    }
}

impl fmt::Display for ExamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RcQuestionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for QuestionTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exam configuration as requested by a caller; every field is optional.
#[derive(Clone, Debug, Default)]
pub struct ExamConfigDraft {
    pub exam_mode: Option<ExamMode>,
    pub timer_mode: Option<TimerMode>,
    pub timer_duration: Option<u32>,
    pub shuffle_questions: Option<bool>,
    pub shuffle_choices: Option<bool>,
    pub rc_question_order: Option<RcQuestionOrder>,
    pub question_type_filter: Option<QuestionTypeFilter>,
    pub selected_question_type: Option<QuestionType>,
}

impl ExamConfigDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill every missing field with its default.
    ///
    /// A zero timer duration falls back to [`DEFAULT_TIMER_MINUTES`]. A
    /// `specific` filter without a selected type selects analogy questions.
    #[must_use]
    pub fn normalize(self) -> ExamConfig {
        let question_type_filter = self.question_type_filter.unwrap_or_default();
        let selected_question_type = match question_type_filter {
            QuestionTypeFilter::All => self.selected_question_type,
            QuestionTypeFilter::Specific => {
                Some(self.selected_question_type.unwrap_or(QuestionType::Analogy))
            }
        };

        ExamConfig {
            exam_mode: self.exam_mode.unwrap_or_default(),
            timer_mode: self.timer_mode.unwrap_or_default(),
            timer_duration: self
                .timer_duration
                .filter(|minutes| *minutes > 0)
                .unwrap_or(DEFAULT_TIMER_MINUTES),
            shuffle_questions: self.shuffle_questions.unwrap_or(true),
            shuffle_choices: self.shuffle_choices.unwrap_or(false),
            rc_question_order: self.rc_question_order.unwrap_or_default(),
            question_type_filter,
            selected_question_type,
        }
    }
}

/// Normalized exam configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExamConfig {
    pub exam_mode: ExamMode,
    pub timer_mode: TimerMode,
    /// Minutes; only meaningful when `timer_mode` is not `None`.
    pub timer_duration: u32,
    pub shuffle_questions: bool,
    pub shuffle_choices: bool,
    pub rc_question_order: RcQuestionOrder,
    pub question_type_filter: QuestionTypeFilter,
    pub selected_question_type: Option<QuestionType>,
}

impl Default for ExamConfig {
    fn default() -> Self {
        ExamConfigDraft::default().normalize()
    }
}

impl ExamConfig {
    /// The question type to restrict to, if any.
    #[must_use]
    pub fn type_filter(&self) -> Option<QuestionType> {
        match self.question_type_filter {
            QuestionTypeFilter::All => None,
            QuestionTypeFilter::Specific => self.selected_question_type,
        }
    }

    /// Timer budget in seconds; zero when untimed.
    #[must_use]
    pub fn timer_budget_secs(&self) -> u32 {
        match self.timer_mode {
            TimerMode::None => 0,
            TimerMode::Total => self.timer_duration.saturating_mul(60),
        }
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.timer_mode != TimerMode::None
    }
}

/// User preferences persisted between launches under a fixed settings key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExamPreferences {
    pub exam_mode: ExamMode,
    pub timer_mode: TimerMode,
    pub selected_timer_duration: u32,
    pub question_type_filter: QuestionTypeFilter,
    pub selected_question_type: QuestionType,
    pub rc_question_order: RcQuestionOrder,
}

impl Default for ExamPreferences {
    fn default() -> Self {
        Self {
            exam_mode: ExamMode::Sectioned,
            timer_mode: TimerMode::None,
            selected_timer_duration: DEFAULT_TIMER_MINUTES,
            question_type_filter: QuestionTypeFilter::All,
            selected_question_type: QuestionType::Analogy,
            rc_question_order: RcQuestionOrder::Sequential,
        }
    }
}

impl ExamPreferences {
    /// Build the configuration a start request submits from these preferences.
    #[must_use]
    pub fn to_draft(&self) -> ExamConfigDraft {
        let selected_question_type = match self.question_type_filter {
            QuestionTypeFilter::All => None,
            QuestionTypeFilter::Specific => Some(self.selected_question_type),
        };
        ExamConfigDraft {
            exam_mode: Some(self.exam_mode),
            timer_mode: Some(self.timer_mode),
            timer_duration: Some(self.selected_timer_duration),
            shuffle_questions: Some(true),
            shuffle_choices: Some(false),
            rc_question_order: Some(self.rc_question_order),
            question_type_filter: Some(self.question_type_filter),
            selected_question_type,
        }
    }
}
