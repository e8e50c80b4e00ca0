//! Council configuration from TOML (`[council]` section)

use council_domain::{ConfigIssue, ConfigIssueCode, ErrorStrategy};
use serde::{Deserialize, Serialize};

/// Raw council-wide settings
///
/// # Example
///
/// ```toml
/// [council]
/// name = "code-review"
/// error_strategy = "retry"    # "halt", "continue", "retry", "fallback"
/// max_retries = 3
/// backoff_ms = 1000
/// projection_limit = 2000
/// default_moderator = "lead"
/// moderator_pool = ["lead", "architect"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    pub name: String,
    pub error_strategy: String,
    pub max_retries: u32,
    /// Backoff unit in milliseconds; retry n waits `backoff_ms * 2^n`
    pub backoff_ms: u64,
    /// Maximum characters of context projected into prompts
    pub projection_limit: usize,
    pub default_moderator: Option<String>,
    pub moderator_pool: Vec<String>,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            name: "council".to_string(),
            error_strategy: "halt".to_string(),
            max_retries: 3,
            backoff_ms: 1000,
            projection_limit: 2000,
            default_moderator: None,
            moderator_pool: Vec::new(),
        }
    }
}

impl FileCouncilConfig {
    /// Parse `error_strategy`, reporting an error issue on failure.
    pub fn parse_error_strategy(&self) -> (ErrorStrategy, Vec<ConfigIssue>) {
        match self.error_strategy.parse::<ErrorStrategy>() {
            Ok(ErrorStrategy::Fallback) => (
                ErrorStrategy::Fallback,
                vec![ConfigIssue::warning(
                    ConfigIssueCode::IgnoredOption,
                    "council.error_strategy: 'fallback' has no handler in file configs \
                     and behaves like 'continue'",
                )],
            ),
            Ok(strategy) => (strategy, vec![]),
            Err(e) => (
                ErrorStrategy::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::InvalidValue,
                    format!("council.error_strategy: {}", e),
                )],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_strategy() {
        let config = FileCouncilConfig {
            error_strategy: "Retry".to_string(),
            ..Default::default()
        };
        let (strategy, issues) = config.parse_error_strategy();
        assert_eq!(strategy, ErrorStrategy::Retry);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_invalid_error_strategy_is_error() {
        let config = FileCouncilConfig {
            error_strategy: "explode".to_string(),
            ..Default::default()
        };
        let (strategy, issues) = config.parse_error_strategy();
        assert_eq!(strategy, ErrorStrategy::Halt);
        assert!(issues[0].is_error());
        assert!(issues[0].message.contains("explode"));
    }

    #[test]
    fn test_fallback_warns() {
        let config = FileCouncilConfig {
            error_strategy: "fallback".to_string(),
            ..Default::default()
        };
        let (_, issues) = config.parse_error_strategy();
        assert_eq!(issues[0].code, ConfigIssueCode::IgnoredOption);
        assert!(!issues[0].is_error());
    }
}
