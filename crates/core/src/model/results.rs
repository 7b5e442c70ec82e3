use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::stats::{AnswerMap, DeferMap, is_deferred, percentage};
use crate::model::{Question, QuestionNumber, QuestionType, ResultId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultsError {
    #[error(
        "total questions ({total}) does not match correct + incorrect + unanswered ({sum})"
    )]
    CountMismatch { total: usize, sum: usize },

    #[error("detail rows ({rows}) do not match total questions ({total})")]
    DetailMismatch { total: usize, rows: usize },
}

/// Scored outcome of a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: Option<String>,
    pub question_number: QuestionNumber,
    pub question_type: QuestionType,
    pub user_answer: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub is_deferred: bool,
    pub is_answered: bool,
}

/// Immutable scored snapshot of a completed exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PersistedResults")]
pub struct ExamResults {
    id: ResultId,
    total_questions: usize,
    correct_answers: usize,
    incorrect_answers: usize,
    unanswered_questions: usize,
    detailed_results: Vec<QuestionResult>,
    #[serde(rename = "timestamp")]
    completed_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedResults {
    id: ResultId,
    total_questions: usize,
    correct_answers: usize,
    incorrect_answers: usize,
    unanswered_questions: usize,
    detailed_results: Vec<QuestionResult>,
    timestamp: DateTime<Utc>,
}

impl TryFrom<PersistedResults> for ExamResults {
    type Error = ResultsError;

    fn try_from(raw: PersistedResults) -> Result<Self, Self::Error> {
        let sum = raw.correct_answers + raw.incorrect_answers + raw.unanswered_questions;
        if sum != raw.total_questions {
            return Err(ResultsError::CountMismatch {
                total: raw.total_questions,
                sum,
            });
        }
        if raw.detailed_results.len() != raw.total_questions {
            return Err(ResultsError::DetailMismatch {
                total: raw.total_questions,
                rows: raw.detailed_results.len(),
            });
        }
        Ok(Self {
            id: raw.id,
            total_questions: raw.total_questions,
            correct_answers: raw.correct_answers,
            incorrect_answers: raw.incorrect_answers,
            unanswered_questions: raw.unanswered_questions,
            detailed_results: raw.detailed_results,
            completed_at: raw.timestamp,
        })
    }
}

impl ExamResults {
    /// Score every question against the recorded answers.
    ///
    /// A question is correct when answered with its correct choice, incorrect
    /// when answered otherwise, and unanswered when no choice is recorded.
    #[must_use]
    pub fn score(
        questions: &[Question],
        answers: &AnswerMap,
        deferred: &DeferMap,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let mut correct = 0;
        let mut incorrect = 0;
        let mut unanswered = 0;

        let detailed_results = questions
            .iter()
            .map(|question| {
                let user_answer = answers.get(&question.number()).copied();
                let is_correct = user_answer.is_some_and(|choice| question.is_correct(choice));
                match (user_answer, is_correct) {
                    (Some(_), true) => correct += 1,
                    (Some(_), false) => incorrect += 1,
                    (None, _) => unanswered += 1,
                }
                QuestionResult {
                    question_id: question.id().map(str::to_owned),
                    question_number: question.number(),
                    question_type: question.question_type(),
                    user_answer,
                    correct_answer: question.answer(),
                    is_correct,
                    is_deferred: is_deferred(deferred, question.number()),
                    is_answered: user_answer.is_some(),
                }
            })
            .collect();

        Self {
            id: ResultId::generate(),
            total_questions: questions.len(),
            correct_answers: correct,
            incorrect_answers: incorrect,
            unanswered_questions: unanswered,
            detailed_results,
            completed_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> ResultId {
        self.id
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> usize {
        self.correct_answers
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> usize {
        self.incorrect_answers
    }

    #[must_use]
    pub fn unanswered_questions(&self) -> usize {
        self.unanswered_questions
    }

    #[must_use]
    pub fn answered_questions(&self) -> usize {
        self.correct_answers + self.incorrect_answers
    }

    #[must_use]
    pub fn detailed_results(&self) -> &[QuestionResult] {
        &self.detailed_results
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Share of answered questions that were correct, rounded to a whole percent.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.correct_answers, self.answered_questions())
    }
}
