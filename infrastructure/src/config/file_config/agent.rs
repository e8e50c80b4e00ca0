//! Agent definitions from TOML (`[[agents]]` array)

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// One command-backed agent
///
/// # Example
///
/// ```toml
/// [[agents]]
/// name = "reviewer"
/// command = "llm"
/// args = ["-m", "gpt-4o"]
/// expertise_level = 0.8
/// timeout_secs = 120
/// ```
///
/// The prompt is written to the command's stdin; its stdout is the reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Weight in weighted votes, `0.0..=1.0`
    pub expertise_level: Option<f64>,
    pub timeout_secs: u64,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            command: String::new(),
            args: Vec::new(),
            expertise_level: None,
            timeout_secs: 300,
        }
    }
}

impl FileAgentConfig {
    pub fn validate(&self, index: usize) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let label = if self.name.is_empty() {
            format!("agents[{}]", index)
        } else {
            format!("agent '{}'", self.name)
        };

        if self.name.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidValue,
                format!("{}: name must not be empty", label),
            ));
        }
        if self.command.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingCommand,
                format!("{}: command must not be empty", label),
            ));
        }
        if let Some(level) = self.expertise_level {
            if !(0.0..=1.0).contains(&level) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ExpertiseOutOfRange,
                    format!("{}: expertise_level {} is outside 0.0..=1.0", label, level),
                ));
            }
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidValue,
                format!("{}: timeout_secs must be greater than 0", label),
            ));
        }

        issues
    }
}
