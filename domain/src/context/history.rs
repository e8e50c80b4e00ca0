//! Audit log entries for context mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The mutation recorded by a [`HistoryEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// A keyed value was added or replaced
    Add,
    /// A stage result was appended
    Result,
    /// Data and results were reset
    Clear,
}

/// One append-only audit record. Used for debugging, never replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    /// Keys touched by the mutation (`stage_{n}` for results)
    pub keys: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(action: HistoryAction, keys: Vec<String>) -> Self {
        Self {
            action,
            keys,
            timestamp: Utc::now(),
        }
    }
}
