//! Final report of a council run.

use crate::context::Context;
use crate::stage::StageResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stages of a council always run one after another.
pub const SEQUENTIAL_WORKFLOW: &str = "sequential";

/// Result surface of `Council::execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouncilReport {
    pub council: String,
    pub task: String,
    pub workflow: String,
    pub steps_completed: usize,
    pub agents_involved: Vec<String>,
    pub results: Vec<StageResult>,
    pub data: Map<String, Value>,
    pub history_length: usize,
    pub created_at: DateTime<Utc>,
    pub version: String,
}

impl CouncilReport {
    /// Build a report from the context after a run.
    pub fn from_context(
        council: impl Into<String>,
        task: impl Into<String>,
        agents_involved: Vec<String>,
        context: &Context,
    ) -> Self {
        let results = context.results();
        Self {
            council: council.into(),
            task: task.into(),
            workflow: SEQUENTIAL_WORKFLOW.to_string(),
            steps_completed: results.len(),
            agents_involved,
            results,
            data: context.data().clone(),
            history_length: context.history().len(),
            created_at: context.metadata().created_at,
            version: context.metadata().version.clone(),
        }
    }

    /// Output of the last stage.
    pub fn final_output(&self) -> Option<&str> {
        self.results.last().map(|r| r.output.as_str())
    }

    /// Number of stages whose failure was absorbed.
    pub fn failed_steps(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_steps() == 0
    }
}
