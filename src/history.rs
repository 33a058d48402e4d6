//! Calculation history persisted through [`Storage`].

use crate::calculator::EvaluationResult;
use crate::format::format_number;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};

/// Storage key holding the history list.
pub const HISTORY_KEY: &str = "history";

/// One evaluated expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The original expression entered by the user.
    pub expression: String,
    /// The formatted result, or the error message.
    pub display: String,
    /// The raw value. None if the evaluation failed.
    pub value: Option<f64>,
    /// Whether this is an error result.
    pub is_error: bool,
}

impl HistoryEntry {
    /// Create a new entry from an evaluation result.
    pub fn from_result(expression: &str, result: &EvaluationResult, precision: usize) -> Self {
        match result {
            EvaluationResult::Number(value) => Self {
                expression: expression.trim().to_string(),
                display: format_number(*value, precision),
                value: Some(*value),
                is_error: false,
            },
            EvaluationResult::Failure(err) => Self {
                expression: expression.trim().to_string(),
                display: err.to_string(),
                value: None,
                is_error: true,
            },
        }
    }
}

/// Most-recent-first list of calculations, capped at `limit` entries.
pub struct History {
    storage: Storage,
    limit: usize,
}

impl History {
    pub fn new(storage: Storage, limit: usize) -> Self {
        Self { storage, limit }
    }

    /// All stored entries, newest first. Unreadable history reads as empty.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.storage.load(HISTORY_KEY, Vec::new())
    }

    /// Prepend `entry` and drop anything past the limit.
    pub fn record(&self, entry: HistoryEntry) -> bool {
        if self.limit == 0 {
            return true;
        }

        let mut entries = self.entries();
        entries.insert(0, entry);
        entries.truncate(self.limit);
        self.storage.save(HISTORY_KEY, &entries)
    }

    pub fn clear(&self) -> bool {
        self.storage.remove(HISTORY_KEY)
    }

    /// The most recent successful value.
    pub fn last_value(&self) -> Option<f64> {
        self.entries().into_iter().find_map(|entry| entry.value)
    }
}
