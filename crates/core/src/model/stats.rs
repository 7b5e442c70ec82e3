//! Pure derivations over an exam's questions, answers and defer flags.
//!
//! Nothing here is cached; callers recompute on demand.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::model::config::ConfigParseError;
use crate::model::{Question, QuestionNumber};

/// Chosen choice index per question. Absence means unanswered.
pub type AnswerMap = HashMap<QuestionNumber, usize>;

/// Defer flag per question. Absence means not deferred.
pub type DeferMap = HashMap<QuestionNumber, bool>;

#[must_use]
pub fn is_deferred(deferred: &DeferMap, number: QuestionNumber) -> bool {
    deferred.get(&number).copied().unwrap_or(false)
}

/// `round(part / whole * 100)`, or 0 when `whole` is 0.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part * 200 + whole) / (whole * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Numbers of questions answered with their correct choice, in exam order.
#[must_use]
pub fn correct_answers(questions: &[Question], answers: &AnswerMap) -> Vec<QuestionNumber> {
    questions
        .iter()
        .filter(|q| answers.get(&q.number()).is_some_and(|c| q.is_correct(*c)))
        .map(Question::number)
        .collect()
}

/// Numbers of questions answered with a wrong choice, in exam order.
#[must_use]
pub fn incorrect_answers(questions: &[Question], answers: &AnswerMap) -> Vec<QuestionNumber> {
    questions
        .iter()
        .filter(|q| answers.get(&q.number()).is_some_and(|c| !q.is_correct(*c)))
        .map(Question::number)
        .collect()
}

#[must_use]
pub fn unanswered_questions(questions: &[Question], answers: &AnswerMap) -> Vec<QuestionNumber> {
    questions
        .iter()
        .filter(|q| !answers.contains_key(&q.number()))
        .map(Question::number)
        .collect()
}

/// Whole-exam progress and score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionStats {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub deferred: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// Correct share of answered questions, in whole percent.
    pub percentage: u32,
}

impl QuestionStats {
    #[must_use]
    pub fn compute(questions: &[Question], answers: &AnswerMap, deferred: &DeferMap) -> Self {
        let mut stats = Self {
            total: questions.len(),
            ..Self::default()
        };
        for question in questions {
            match answers.get(&question.number()) {
                Some(choice) if question.is_correct(*choice) => {
                    stats.answered += 1;
                    stats.correct += 1;
                }
                Some(_) => {
                    stats.answered += 1;
                    stats.incorrect += 1;
                }
                None => {}
            }
            if is_deferred(deferred, question.number()) {
                stats.deferred += 1;
            }
        }
        stats.unanswered = stats.total - stats.answered;
        stats.percentage = percentage(stats.correct, stats.answered);
        stats
    }
}

/// Progress within one section, shown at the section checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionStats {
    pub section: u32,
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub deferred: usize,
}

impl SectionStats {
    #[must_use]
    pub fn compute(
        section: u32,
        questions: &[Question],
        answers: &AnswerMap,
        deferred: &DeferMap,
    ) -> Self {
        let mut stats = Self {
            section,
            total: 0,
            answered: 0,
            unanswered: 0,
            deferred: 0,
        };
        for question in questions.iter().filter(|q| q.section() == section) {
            stats.total += 1;
            if answers.contains_key(&question.number()) {
                stats.answered += 1;
            } else {
                stats.unanswered += 1;
            }
            if is_deferred(deferred, question.number()) {
                stats.deferred += 1;
            }
        }
        stats
    }

    /// Answered share of the section, in whole percent.
    #[must_use]
    pub fn completion(&self) -> u32 {
        percentage(self.answered, self.total)
    }
}

/// Which questions the overall review list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFilter {
    #[default]
    All,
    Answered,
    Unanswered,
    Deferred,
}

impl ReviewFilter {
    #[must_use]
    pub fn matches(self, question: &Question, answers: &AnswerMap, deferred: &DeferMap) -> bool {
        let number = question.number();
        match self {
            ReviewFilter::All => true,
            ReviewFilter::Answered => answers.contains_key(&number),
            ReviewFilter::Unanswered => !answers.contains_key(&number),
            ReviewFilter::Deferred => is_deferred(deferred, number),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewFilter::All => "all",
            ReviewFilter::Answered => "answered",
            ReviewFilter::Unanswered => "unanswered",
            ReviewFilter::Deferred => "deferred",
        }
    }
}

impl fmt::Display for ReviewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewFilter {
    type Err = ConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(Self::All),
            "answered" => Ok(Self::Answered),
            "unanswered" => Ok(Self::Unanswered),
            "deferred" => Ok(Self::Deferred),
            other => Err(ConfigParseError::new("review filter", other)),
        }
    }
}
