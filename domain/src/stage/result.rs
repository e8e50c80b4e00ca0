//! Stage result value object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output of one stage execution.
///
/// Metadata keys vary per stage type: debates record `winner`, `proposals`,
/// `votes` and friends, parallel stages record `parallelResults` and the
/// merge `strategy`. Substitute results produced by the error handler carry
/// `error` and `skipped`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// Text handed to later stages and to the caller
    pub output: String,
    /// Stage-specific structured details (insertion ordered)
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// `false` for substitutes produced after a failure was absorbed
    pub success: bool,
}

impl StageResult {
    /// Create a successful result with empty metadata.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            metadata: Map::new(),
            success: true,
        }
    }

    /// Create a failed result with empty metadata.
    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            metadata: Map::new(),
            success: false,
        }
    }

    /// Add a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merge a whole metadata map into this result.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    /// Look up a metadata entry.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Whether this result was substituted for a failed stage.
    pub fn is_skipped(&self) -> bool {
        self.metadata
            .get("skipped")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
