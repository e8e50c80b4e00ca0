//! Error strategy applied when a stage fails.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// What the orchestrator does with a failed stage.
///
/// - `Halt`: abort the run with the error (default)
/// - `Continue`: record a failed substitute result and move on
/// - `Retry`: re-run the stage with exponential backoff, then halt
/// - `Fallback`: ask a fallback handler for a substitute result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStrategy {
    #[default]
    Halt,
    Continue,
    Retry,
    Fallback,
}

impl ErrorStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStrategy::Halt => "halt",
            ErrorStrategy::Continue => "continue",
            ErrorStrategy::Retry => "retry",
            ErrorStrategy::Fallback => "fallback",
        }
    }

    /// Whether a failure under this strategy can still yield a result.
    pub fn absorbs_failures(&self) -> bool {
        matches!(self, ErrorStrategy::Continue | ErrorStrategy::Fallback)
    }
}

impl std::fmt::Display for ErrorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ErrorStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "halt" => Ok(ErrorStrategy::Halt),
            "continue" => Ok(ErrorStrategy::Continue),
            "retry" => Ok(ErrorStrategy::Retry),
            "fallback" => Ok(ErrorStrategy::Fallback),
            _ => Err(DomainError::UnknownErrorStrategy(s.to_string())),
        }
    }
}
