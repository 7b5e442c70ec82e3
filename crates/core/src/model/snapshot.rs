use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::model::{ExamConfig, ExamResults};

/// The part of the exam store that survives restarts.
///
/// Holds the last configuration and the result history only; live session
/// state (questions, answers, defer flags, cursors, timer) has no field here.
///
/// History entries that fail validation are dropped one at a time when
/// decoding, so a single bad record never costs the rest of the history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredSnapshot")]
pub struct ExamSnapshot {
    #[serde(flatten)]
    pub config: ExamConfig,
    pub result_history: Vec<ExamResults>,
    /// Number of history entries dropped while decoding. Never written.
    #[serde(skip)]
    pub discarded_results: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSnapshot {
    #[serde(flatten)]
    config: ExamConfig,
    #[serde(default)]
    result_history: Vec<StoredResult>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredResult {
    Valid(ExamResults),
    Invalid(IgnoredAny),
}

impl From<StoredSnapshot> for ExamSnapshot {
    fn from(stored: StoredSnapshot) -> Self {
        let total = stored.result_history.len();
        let result_history: Vec<ExamResults> = stored
            .result_history
            .into_iter()
            .filter_map(|entry| match entry {
                StoredResult::Valid(results) => Some(results),
                StoredResult::Invalid(_) => None,
            })
            .collect();
        Self {
            config: stored.config,
            discarded_results: total - result_history.len(),
            result_history,
        }
    }
}
