//! Shared context flowing between stages.

use super::history::{HistoryAction, HistoryEntry};
use crate::core::string::truncate_with_marker;
use crate::stage::StageResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default character budget for [`Context::prompt_projection`].
pub const DEFAULT_PROJECTION_LIMIT: usize = 2000;

/// Number of most recent stage results included in a projection.
pub const PROJECTED_RESULTS: usize = 3;

/// Appended to a projection that was cut at its character budget.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

const CONTEXT_VERSION: &str = "1.0.0";

/// Creation metadata of a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMetadata {
    pub created_at: DateTime<Utc>,
    pub version: String,
}

impl Default for ContextMetadata {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            version: CONTEXT_VERSION.to_string(),
        }
    }
}

/// Snapshot of a context for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSummary {
    pub data: Map<String, Value>,
    pub results: Vec<StageResult>,
    pub metadata: ContextMetadata,
    pub history_length: usize,
}

/// Append-only accumulator of keyed values and ordered stage results.
///
/// Created once per council run (or reused across runs when the caller
/// supplies one). The orchestrator appends a result after every stage and
/// later stages read the textual projection when building prompts. Reads
/// happen before a stage's agent batch starts and writes only after it
/// settles, so no interior locking is needed.
///
/// # Example
///
/// ```
/// use council_domain::{Context, StageResult};
///
/// let mut ctx = Context::new();
/// ctx.add("topic", "caching");
/// ctx.add_result(StageResult::success("use an LRU"));
///
/// assert_eq!(ctx.results().len(), 1);
/// assert!(ctx.prompt_projection().starts_with("Current Context:"));
/// ```
#[derive(Debug, Clone)]
pub struct Context {
    data: Map<String, Value>,
    stage_results: Vec<StageResult>,
    history: Vec<HistoryEntry>,
    metadata: ContextMetadata,
    projection_limit: usize,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            data: Map::new(),
            stage_results: Vec::new(),
            history: Vec::new(),
            metadata: ContextMetadata::default(),
            projection_limit: DEFAULT_PROJECTION_LIMIT,
        }
    }

    /// Create a context seeded with initial data (not logged in history).
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self {
            data,
            ..Self::new()
        }
    }

    /// Set the character budget used by [`Context::prompt_projection`].
    pub fn with_projection_limit(mut self, limit: usize) -> Self {
        self.projection_limit = limit;
        self
    }

    pub fn projection_limit(&self) -> usize {
        self.projection_limit
    }

    // ==================== Mutations ====================

    /// Add or replace a keyed value.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        self.data.insert(key.clone(), value.into());
        self.history
            .push(HistoryEntry::new(HistoryAction::Add, vec![key]));
    }

    /// Append a stage result.
    pub fn add_result(&mut self, result: StageResult) {
        let key = format!("stage_{}", self.stage_results.len());
        self.stage_results.push(result);
        self.history
            .push(HistoryEntry::new(HistoryAction::Result, vec![key]));
    }

    /// Reset data and results. History and creation metadata are kept.
    pub fn clear(&mut self) {
        let keys = self.data.keys().cloned().collect();
        self.data.clear();
        self.stage_results.clear();
        self.history
            .push(HistoryEntry::new(HistoryAction::Clear, keys));
    }

    // ==================== Reads ====================

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Get a value, or `default` when the key is absent.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.data.get(key).cloned().unwrap_or_else(|| default.into())
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Owned copy of all stage results in execution order.
    pub fn results(&self) -> Vec<StageResult> {
        self.stage_results.clone()
    }

    pub fn result_count(&self) -> usize {
        self.stage_results.len()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn metadata(&self) -> &ContextMetadata {
        &self.metadata
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.stage_results.is_empty()
    }

    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            data: self.data.clone(),
            results: self.results(),
            metadata: self.metadata.clone(),
            history_length: self.history.len(),
        }
    }

    // ==================== Prompt Projection ====================

    /// Render current data plus the last [`PROJECTED_RESULTS`] stage results
    /// for injection into agent prompts, capped at `max_length` characters.
    pub fn to_prompt_projection(&self, max_length: usize) -> String {
        #[derive(Serialize)]
        struct Projection<'a> {
            current_data: &'a Map<String, Value>,
            recent_results: &'a [StageResult],
        }

        let start = self.stage_results.len().saturating_sub(PROJECTED_RESULTS);
        let projection = Projection {
            current_data: &self.data,
            recent_results: &self.stage_results[start..],
        };

        let rendered =
            serde_json::to_string_pretty(&projection).unwrap_or_else(|_| "{}".to_string());

        format!(
            "Current Context:\n{}",
            truncate_with_marker(&rendered, max_length, TRUNCATION_MARKER)
        )
    }

    /// [`Context::to_prompt_projection`] with the configured limit.
    pub fn prompt_projection(&self) -> String {
        self.to_prompt_projection(self.projection_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_and_get() {
        let mut ctx = Context::new();
        ctx.add("lang", "rust");
        assert_eq!(ctx.get("lang"), Some(&json!("rust")));
        assert_eq!(ctx.get("missing"), None);
        assert_eq!(ctx.get_or("missing", 7), json!(7));
    }

    #[test]
    fn test_add_replaces_value() {
        let mut ctx = Context::new();
        ctx.add("k", 1);
        ctx.add("k", 2);
        assert_eq!(ctx.get("k"), Some(&json!(2)));
        assert_eq!(ctx.history().len(), 2);
    }

    #[test]
    fn test_with_data_seeds_without_history() {
        let mut seed = Map::new();
        seed.insert("project".to_string(), json!("council"));
        let ctx = Context::with_data(seed);
        assert_eq!(ctx.get("project"), Some(&json!("council")));
        assert!(ctx.history().is_empty());
    }

    #[test]
    fn test_history_records_every_mutation() {
        let mut ctx = Context::new();
        ctx.add("a", 1);
        ctx.add_result(StageResult::success("one"));
        ctx.add_result(StageResult::success("two"));
        ctx.clear();

        let actions: Vec<_> = ctx.history().iter().map(|h| h.action).collect();
        assert_eq!(
            actions,
            vec![
                HistoryAction::Add,
                HistoryAction::Result,
                HistoryAction::Result,
                HistoryAction::Clear
            ]
        );
        assert_eq!(ctx.history()[1].keys, vec!["stage_0"]);
        assert_eq!(ctx.history()[2].keys, vec!["stage_1"]);
        assert_eq!(ctx.history()[3].keys, vec!["a"]);
    }

    #[test]
    fn test_results_returns_independent_copy() {
        let mut ctx = Context::new();
        ctx.add_result(StageResult::success("original"));

        let first = ctx.results();
        let second = ctx.results();
        assert_eq!(first, second);

        let mut copy = ctx.results();
        copy[0].output = "mutated".to_string();
        copy.push(StageResult::success("extra"));

        assert_eq!(ctx.results()[0].output, "original");
        assert_eq!(ctx.result_count(), 1);
    }

    #[test]
    fn test_clear_resets_data_and_results() {
        let mut ctx = Context::new();
        ctx.add("a", 1);
        ctx.add_result(StageResult::success("r"));
        ctx.clear();
        assert!(ctx.is_empty());
        assert_eq!(ctx.history().len(), 3);
    }

    #[test]
    fn test_projection_includes_only_last_three_results() {
        let mut ctx = Context::new();
        for i in 0..5 {
            ctx.add_result(StageResult::success(format!("result-{}", i)));
        }

        let projection = ctx.to_prompt_projection(10_000);
        assert!(projection.starts_with("Current Context:\n"));
        assert!(!projection.contains("result-0"));
        assert!(!projection.contains("result-1"));
        assert!(projection.contains("result-2"));
        assert!(projection.contains("result-3"));
        assert!(projection.contains("result-4"));
    }

    #[test]
    fn test_projection_includes_data() {
        let mut ctx = Context::new();
        ctx.add("deadline", "friday");
        let projection = ctx.to_prompt_projection(10_000);
        assert!(projection.contains("current_data"));
        assert!(projection.contains("friday"));
    }

    #[test]
    fn test_projection_is_truncated_with_marker() {
        let mut ctx = Context::new();
        ctx.add("blob", "x".repeat(5_000));

        let projection = ctx.to_prompt_projection(100);
        assert!(projection.ends_with(TRUNCATION_MARKER));
        let body = projection.trim_start_matches("Current Context:\n");
        assert_eq!(
            body.chars().count(),
            100 + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_projection_uses_configured_limit() {
        let mut ctx = Context::new().with_projection_limit(50);
        ctx.add("blob", "y".repeat(500));
        assert!(ctx.prompt_projection().ends_with(TRUNCATION_MARKER));
        assert_eq!(ctx.projection_limit(), 50);
    }

    #[test]
    fn test_default_projection_limit() {
        assert_eq!(Context::new().projection_limit(), DEFAULT_PROJECTION_LIMIT);
    }

    #[test]
    fn test_summary() {
        let mut ctx = Context::new();
        ctx.add("a", true);
        ctx.add_result(StageResult::success("r"));
        let summary = ctx.summary();
        assert_eq!(summary.history_length, 2);
        assert_eq!(summary.results.len(), 1);
        assert_eq!(summary.metadata.version, "1.0.0");
    }
}
