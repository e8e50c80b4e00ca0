//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Enum-valued settings stay strings here so that bad values surface as
//! [`ConfigIssue`]s from [`FileConfig::validate`] instead of parse failures.

mod agent;
mod council;
mod logging;
mod output;
mod stage;

pub use agent::FileAgentConfig;
pub use council::FileCouncilConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use stage::{FileParallelStrategy, FileStageConfig};

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Council-wide settings
    pub council: FileCouncilConfig,
    /// Agent definitions
    pub agents: Vec<FileAgentConfig>,
    /// Pipeline, in execution order
    pub stages: Vec<FileStageConfig>,
    /// Output settings
    pub output: FileOutputConfig,
    /// Event log settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    pub fn agent(&self, name: &str) -> Option<&FileAgentConfig> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks, in order:
    /// 1. Council settings (error strategy, moderators)
    /// 2. Agent definitions (names, commands, expertise)
    /// 3. Stages (agent references, per-type options)
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Council settings
        issues.extend(self.council.parse_error_strategy().1);

        let mut known: HashSet<&str> = HashSet::new();
        for agent in &self.agents {
            if !agent.name.is_empty() && !known.insert(agent.name.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateAgent,
                    format!("agent '{}' is defined more than once", agent.name),
                ));
            }
        }

        let moderators = self
            .council
            .default_moderator
            .iter()
            .chain(self.council.moderator_pool.iter());
        for name in moderators {
            if !known.contains(name.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownAgent,
                    format!("council: moderator '{}' is not defined in [[agents]]", name),
                ));
            }
        }

        // 2. Agents
        for (index, agent) in self.agents.iter().enumerate() {
            issues.extend(agent.validate(index));
        }

        // 3. Stages
        if self.stages.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoStages,
                "no [[stages]] defined",
            ));
        }
        let moderator_available =
            self.council.default_moderator.is_some() || !self.council.moderator_pool.is_empty();
        for (index, stage) in self.stages.iter().enumerate() {
            issues.extend(stage.validate(index, &known, moderator_available));
        }

        issues
    }
}
