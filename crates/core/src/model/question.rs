use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::QuestionNumber;
use crate::sections::section_for_index;

/// Kind of verbal-aptitude question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Analogy,
    Completion,
    Error,
    /// Reading comprehension; questions of one passage share its text.
    #[serde(rename = "rc")]
    ReadingComprehension,
    #[serde(rename = "odd")]
    OddOneOut,
}

impl QuestionType {
    pub const ALL: [QuestionType; 5] = [
        QuestionType::Analogy,
        QuestionType::Completion,
        QuestionType::Error,
        QuestionType::ReadingComprehension,
        QuestionType::OddOneOut,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Analogy => "analogy",
            QuestionType::Completion => "completion",
            QuestionType::Error => "error",
            QuestionType::ReadingComprehension => "rc",
            QuestionType::OddOneOut => "odd",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Analogy => "Verbal analogy",
            QuestionType::Completion => "Sentence completion",
            QuestionType::Error => "Contextual error",
            QuestionType::ReadingComprehension => "Reading comprehension",
            QuestionType::OddOneOut => "Odd one out",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| QuestionError::UnknownType(s.to_owned()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("unknown question type: {0}")]
    UnknownType(String),

    #[error("question {number} has empty text")]
    EmptyText { number: u32 },

    #[error("question {number} has no choices")]
    NoChoices { number: u32 },

    #[error("question {number} marks choice {answer} correct but only has {choices} choices")]
    AnswerOutOfRange {
        number: u32,
        answer: usize,
        choices: usize,
    },
}

/// A question as supplied by a question source, before it is issued to an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question_number: u32,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage: Option<String>,
    /// Index into `choices` of the correct choice.
    pub answer: usize,
}

/// A question issued to a running exam. Read-only once issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: Option<String>,
    number: QuestionNumber,
    original_number: u32,
    question_type: QuestionType,
    text: String,
    choices: Vec<String>,
    passage: Option<String>,
    answer: usize,
    section: u32,
}

impl Question {
    /// Issue `record` at position `index` of the final exam order.
    ///
    /// The question is renumbered to `index + 1`, keeps its source number as
    /// `original_number`, and is placed in the section derived from `index`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the record has blank text, no choices, or an
    /// answer index outside its choices.
    pub fn issue(record: QuestionRecord, index: usize) -> Result<Self, QuestionError> {
        let original = record.question_number;
        if record.question.trim().is_empty() {
            return Err(QuestionError::EmptyText { number: original });
        }
        if record.choices.is_empty() {
            return Err(QuestionError::NoChoices { number: original });
        }
        if record.answer >= record.choices.len() {
            return Err(QuestionError::AnswerOutOfRange {
                number: original,
                answer: record.answer,
                choices: record.choices.len(),
            });
        }

        let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        Ok(Self {
            id: record.id,
            number: QuestionNumber::new(number),
            original_number: original,
            question_type: record.question_type,
            text: record.question,
            choices: record.choices,
            passage: record.passage,
            answer: record.answer,
            section: section_for_index(index),
        })
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn number(&self) -> QuestionNumber {
        self.number
    }

    #[must_use]
    pub fn original_number(&self) -> u32 {
        self.original_number
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn passage(&self) -> Option<&str> {
        self.passage.as_deref()
    }

    /// Index of the correct choice.
    #[must_use]
    pub fn answer(&self) -> usize {
        self.answer
    }

    #[must_use]
    pub fn section(&self) -> u32 {
        self.section
    }

    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        self.answer == choice
    }
}
