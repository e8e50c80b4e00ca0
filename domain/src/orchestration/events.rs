//! Lifecycle events emitted while a council runs.

use super::policy::ErrorStrategy;
use crate::stage::{StageKind, StageResult};
use serde::{Deserialize, Serialize};

/// A council lifecycle event.
///
/// Serialized with a `type` field carrying the event name, e.g.
/// `{"type":"step:start","index":0,"kind":"debate","total":2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum CouncilEvent {
    #[serde(rename = "council:start")]
    CouncilStart { council: String, task: String },

    #[serde(rename = "step:start")]
    StepStart {
        index: usize,
        kind: StageKind,
        total: usize,
    },

    /// `result.output` is shortened for the event stream
    #[serde(rename = "step:complete")]
    StepComplete {
        index: usize,
        kind: StageKind,
        result: StageResult,
    },

    #[serde(rename = "step:error")]
    StepError {
        step: usize,
        kind: StageKind,
        error: String,
        attempt: u32,
        strategy: ErrorStrategy,
    },

    #[serde(rename = "step:retry")]
    StepRetry {
        step: usize,
        attempt: u32,
        delay_ms: u64,
    },

    #[serde(rename = "step:retry_success")]
    StepRetrySuccess { step: usize, attempts: u32 },

    #[serde(rename = "step:fallback")]
    StepFallback { step: usize, handler: bool },

    #[serde(rename = "council:complete")]
    CouncilComplete {
        council: String,
        steps_completed: usize,
    },
}

impl CouncilEvent {
    /// Wire name of the event (the `type` field).
    pub fn name(&self) -> &'static str {
        match self {
            CouncilEvent::CouncilStart { .. } => "council:start",
            CouncilEvent::StepStart { .. } => "step:start",
            CouncilEvent::StepComplete { .. } => "step:complete",
            CouncilEvent::StepError { .. } => "step:error",
            CouncilEvent::StepRetry { .. } => "step:retry",
            CouncilEvent::StepRetrySuccess { .. } => "step:retry_success",
            CouncilEvent::StepFallback { .. } => "step:fallback",
            CouncilEvent::CouncilComplete { .. } => "council:complete",
        }
    }

    /// Stage index the event refers to, if any.
    pub fn step(&self) -> Option<usize> {
        match self {
            CouncilEvent::StepStart { index, .. } | CouncilEvent::StepComplete { index, .. } => {
                Some(*index)
            }
            CouncilEvent::StepError { step, .. }
            | CouncilEvent::StepRetry { step, .. }
            | CouncilEvent::StepRetrySuccess { step, .. }
            | CouncilEvent::StepFallback { step, .. } => Some(*step),
            CouncilEvent::CouncilStart { .. } | CouncilEvent::CouncilComplete { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_with_type_tag() {
        let event = CouncilEvent::StepStart {
            index: 1,
            kind: StageKind::Debate,
            total: 3,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"type": "step:start", "index": 1, "kind": "debate", "total": 3})
        );
    }

    #[test]
    fn test_fields_are_camel_case() {
        let event = CouncilEvent::CouncilComplete {
            council: "review".to_string(),
            steps_completed: 2,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "council:complete");
        assert_eq!(value["stepsCompleted"], 2);
    }

    #[test]
    fn test_name_matches_tag() {
        let events = vec![
            CouncilEvent::CouncilStart {
                council: "c".to_string(),
                task: "t".to_string(),
            },
            CouncilEvent::StepRetry {
                step: 0,
                attempt: 1,
                delay_ms: 10,
            },
            CouncilEvent::StepRetrySuccess { step: 0, attempts: 2 },
            CouncilEvent::StepFallback { step: 0, handler: false },
            CouncilEvent::StepError {
                step: 0,
                kind: StageKind::Parallel,
                error: "boom".to_string(),
                attempt: 0,
                strategy: ErrorStrategy::Continue,
            },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], event.name());
        }
    }

    #[test]
    fn test_deserialize() {
        let event: CouncilEvent =
            serde_json::from_str(r#"{"type":"step:fallback","step":2,"handler":true}"#).unwrap();
        assert_eq!(event, CouncilEvent::StepFallback { step: 2, handler: true });
        assert_eq!(event.step(), Some(2));
    }
}
