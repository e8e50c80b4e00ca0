//! Stage kind identifier.

use serde::{Deserialize, Serialize};

/// The type of a pipeline stage, as reported in lifecycle events and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// Concurrent fan-out with a merge strategy
    Parallel,
    /// Proposal rounds followed by a vote
    Debate,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Parallel => "parallel",
            StageKind::Debate => "debate",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StageKind::Parallel => "Parallel",
            StageKind::Debate => "Debate",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parallel" => Ok(StageKind::Parallel),
            "debate" => Ok(StageKind::Debate),
            other => Err(format!(
                "Unknown stage type: {}. Valid: parallel, debate",
                other
            )),
        }
    }
}
