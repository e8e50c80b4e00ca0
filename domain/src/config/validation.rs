//! Structured configuration issues.
//!
//! Stage validation and file configuration validation both report problems
//! as a list of [`ConfigIssue`]s. An empty list means the configuration is
//! usable; any [`Severity::Error`] entry aborts before an agent is called.
//!
//! ```
//! use council_domain::config::{ConfigIssue, ConfigIssueCode, has_errors};
//!
//! let issues = vec![ConfigIssue::warning(
//!     ConfigIssueCode::IgnoredOption,
//!     "rounds is ignored for parallel stages",
//! )];
//! assert!(!has_errors(&issues));
//! ```

use serde::Serialize;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fatal: the council cannot run.
    Error,
    /// Non-fatal: the council runs but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigIssueCode {
    /// A stage has no agents.
    NoAgents,
    /// Two agents in one stage share a name.
    DuplicateAgent,
    /// Moderator voting without a moderator.
    MissingModerator,
    /// A stage or setting references an agent that is not defined.
    UnknownAgent,
    /// An agent definition has no command.
    MissingCommand,
    /// The configuration defines no stages.
    NoStages,
    /// An enum-valued setting has an unrecognised value.
    InvalidValue,
    /// A synthesis stage has no synthesizer.
    MissingSynthesizer,
    /// An expertise level outside `0.0..=1.0`.
    ExpertiseOutOfRange,
    /// A setting that has no effect for this stage type.
    IgnoredOption,
}

/// A detected issue in a configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "error: {}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

/// Check whether any issues are errors (i.e. fatal).
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(ConfigIssue::is_error)
}
