use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::path::Path;

use exam_core::model::{ExamConfig, QuestionRecord, QuestionType, RcQuestionOrder};

use crate::error::QuestionSourceError;

/// Supplies the ordered questions for a new exam.
///
/// Implementations are treated as a pure function of the configuration. An
/// empty list is not an error here; the exam store rejects it.
pub trait QuestionSource: Send + Sync {
    /// Produce the questions for `config`, in final exam order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` if the questions cannot be produced.
    fn generate(&self, config: &ExamConfig) -> Result<Vec<QuestionRecord>, QuestionSourceError>;
}

/// In-memory question bank loaded from a JSON array of question records.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    records: Vec<QuestionRecord>,
    seed: Option<u64>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(records: Vec<QuestionRecord>) -> Self {
        Self {
            records,
            seed: None,
        }
    }

    /// Use a fixed RNG seed so every generation shuffles the same way.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a bank from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError::Parse` if the text is not an array of records.
    pub fn from_json_str(raw: &str) -> Result<Self, QuestionSourceError> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    /// Load a bank from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError::Io` if the file cannot be read, or
    /// `QuestionSourceError::Parse` if its content is invalid.
    pub fn from_path(path: &Path) -> Result<Self, QuestionSourceError> {
        let raw = std::fs::read_to_string(path).map_err(|source| QuestionSourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

impl QuestionSource for QuestionBank {
    fn generate(&self, config: &ExamConfig) -> Result<Vec<QuestionRecord>, QuestionSourceError> {
        let mut rng = self.rng();
        let selected: Vec<QuestionRecord> = match config.type_filter() {
            Some(wanted) => self
                .records
                .iter()
                .filter(|r| r.question_type == wanted)
                .cloned()
                .collect(),
            None => self.records.clone(),
        };

        let mut ordered = arrange(selected, config, &mut rng);
        if config.shuffle_choices {
            for record in &mut ordered {
                shuffle_choices(record, &mut rng);
            }
        }
        Ok(ordered)
    }
}

fn arrange(
    mut records: Vec<QuestionRecord>,
    config: &ExamConfig,
    rng: &mut StdRng,
) -> Vec<QuestionRecord> {
    if !config.shuffle_questions {
        return records;
    }
    match config.rc_question_order {
        RcQuestionOrder::Random => {
            records.shuffle(rng);
            records
        }
        RcQuestionOrder::Sequential => {
            let mut units = group_by_passage(records);
            units.shuffle(rng);
            units.into_iter().flatten().collect()
        }
    }
}

/// Split records into shuffle units: one per non-RC question and one per
/// passage. Passage groups appear at their first question's position and keep
/// their internal order. RC records without a passage share a single group.
fn group_by_passage(records: Vec<QuestionRecord>) -> Vec<Vec<QuestionRecord>> {
    let mut units: Vec<Vec<QuestionRecord>> = Vec::new();
    let mut passage_slots: HashMap<Option<String>, usize> = HashMap::new();

    for record in records {
        if record.question_type != QuestionType::ReadingComprehension {
            units.push(vec![record]);
            continue;
        }
        if let Some(&slot) = passage_slots.get(&record.passage) {
            units[slot].push(record);
        } else {
            passage_slots.insert(record.passage.clone(), units.len());
            units.push(vec![record]);
        }
    }
    units
}

/// Permute choices and remap `answer` to the same choice text.
fn shuffle_choices(record: &mut QuestionRecord, rng: &mut StdRng) {
    let mut order: Vec<usize> = (0..record.choices.len()).collect();
    order.shuffle(rng);
    if let Some(new_answer) = order.iter().position(|&old| old == record.answer) {
        record.answer = new_answer;
    }
    record.choices = order.iter().map(|&old| record.choices[old].clone()).collect();
}
