//! Stage definitions from TOML (`[[stages]]` array)

use council_domain::{ConfigIssue, ConfigIssueCode, SplitMethod, StageKind, VotingMethod};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Parallel strategy names accepted in `strategy = "..."`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileParallelStrategy {
    #[default]
    Uniform,
    DomainSplit,
    TaskSplit,
    LoadBalanced,
    Synthesis,
}

impl FileParallelStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileParallelStrategy::Uniform => "uniform",
            FileParallelStrategy::DomainSplit => "domain_split",
            FileParallelStrategy::TaskSplit => "task_split",
            FileParallelStrategy::LoadBalanced => "load_balanced",
            FileParallelStrategy::Synthesis => "synthesis",
        }
    }
}

impl std::str::FromStr for FileParallelStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "uniform" => Ok(FileParallelStrategy::Uniform),
            "domain_split" | "domain" => Ok(FileParallelStrategy::DomainSplit),
            "task_split" | "split" => Ok(FileParallelStrategy::TaskSplit),
            "load_balanced" | "balanced" => Ok(FileParallelStrategy::LoadBalanced),
            "synthesis" => Ok(FileParallelStrategy::Synthesis),
            _ => Err(format!(
                "Unknown parallel strategy: {}. Valid: uniform, domain_split, task_split, \
                 load_balanced, synthesis",
                s
            )),
        }
    }
}

/// One pipeline stage
///
/// # Example
///
/// ```toml
/// [[stages]]
/// type = "parallel"
/// agents = ["security", "performance"]
/// strategy = "domain_split"
/// domains = ["security", "performance"]
///
/// [[stages]]
/// type = "debate"
/// agents = ["security", "performance", "lead"]
/// rounds = 2
/// voting = "weighted"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStageConfig {
    /// `"parallel"` or `"debate"`
    #[serde(rename = "type")]
    pub kind: String,
    pub agents: Vec<String>,

    // ---- debate ----
    pub rounds: Option<usize>,
    pub voting: Option<String>,
    pub moderator: Option<String>,
    pub moderator_guidance: bool,
    pub allow_self_votes: bool,
    pub structured_proposals: bool,

    // ---- parallel ----
    pub strategy: Option<String>,
    pub domains: Vec<String>,
    pub split_method: Option<String>,
    pub synthesizer: Option<String>,
    pub capability_key: Option<String>,
    pub require_all: bool,
}

impl Default for FileStageConfig {
    fn default() -> Self {
        Self {
            kind: "parallel".to_string(),
            agents: Vec::new(),
            rounds: None,
            voting: None,
            moderator: None,
            moderator_guidance: false,
            allow_self_votes: true,
            structured_proposals: false,
            strategy: None,
            domains: Vec::new(),
            split_method: None,
            synthesizer: None,
            capability_key: None,
            require_all: false,
        }
    }
}

impl FileStageConfig {
    pub fn parse_kind(&self) -> Result<StageKind, String> {
        self.kind.parse()
    }

    pub fn parse_voting(&self) -> Result<VotingMethod, String> {
        match &self.voting {
            Some(v) => v.parse().map_err(|e: council_domain::DomainError| e.to_string()),
            None => Ok(VotingMethod::default()),
        }
    }

    pub fn parse_strategy(&self) -> Result<FileParallelStrategy, String> {
        match &self.strategy {
            Some(s) => s.parse(),
            None => Ok(FileParallelStrategy::default()),
        }
    }

    pub fn parse_split_method(&self) -> Result<SplitMethod, String> {
        match &self.split_method {
            Some(m) => m.parse().map_err(|e: council_domain::DomainError| e.to_string()),
            None => Ok(SplitMethod::default()),
        }
    }

    /// Validate this stage against the defined agent names.
    ///
    /// `moderator_available` tells whether a council-wide default moderator
    /// or pool can fill in a missing debate moderator.
    pub fn validate(
        &self,
        index: usize,
        known_agents: &HashSet<&str>,
        moderator_available: bool,
    ) -> Vec<ConfigIssue> {
        let label = format!("stages[{}]", index);
        let mut issues = Vec::new();

        if self.agents.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoAgents,
                format!("{}: no agents listed", label),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.agents {
            if !known_agents.contains(name.as_str()) {
                issues.push(unknown_agent(&label, name));
            }
            if !seen.insert(name.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateAgent,
                    format!("{}: agent '{}' listed more than once", label, name),
                ));
            }
        }

        match self.parse_kind() {
            Ok(StageKind::Debate) => {
                self.validate_debate(&label, known_agents, moderator_available, &mut issues)
            }
            Ok(StageKind::Parallel) => self.validate_parallel(&label, known_agents, &mut issues),
            Err(e) => issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidValue,
                format!("{}: {}", label, e),
            )),
        }

        issues
    }

    fn validate_debate(
        &self,
        label: &str,
        known_agents: &HashSet<&str>,
        moderator_available: bool,
        issues: &mut Vec<ConfigIssue>,
    ) {
        match self.parse_voting() {
            Ok(voting) => {
                let has_moderator = self.moderator.is_some() || moderator_available;
                if voting.requires_moderator() && !has_moderator {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::MissingModerator,
                        format!("{}: moderator voting requires a moderator", label),
                    ));
                }
            }
            Err(e) => issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidValue,
                format!("{}: {}", label, e),
            )),
        }

        if let Some(moderator) = &self.moderator {
            if !known_agents.contains(moderator.as_str()) {
                issues.push(unknown_agent(label, moderator));
            }
        }

        let parallel_only = [
            ("strategy", self.strategy.is_some()),
            ("domains", !self.domains.is_empty()),
            ("split_method", self.split_method.is_some()),
            ("synthesizer", self.synthesizer.is_some()),
            ("capability_key", self.capability_key.is_some()),
            ("require_all", self.require_all),
        ];
        ignored(label, "debate", &parallel_only, issues);
    }

    fn validate_parallel(
        &self,
        label: &str,
        known_agents: &HashSet<&str>,
        issues: &mut Vec<ConfigIssue>,
    ) {
        match self.parse_strategy() {
            Ok(FileParallelStrategy::Synthesis) => match &self.synthesizer {
                None => issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingSynthesizer,
                    format!("{}: synthesis strategy requires a synthesizer", label),
                )),
                Some(name) if !known_agents.contains(name.as_str()) => {
                    issues.push(unknown_agent(label, name))
                }
                Some(_) => {}
            },
            Ok(_) => {}
            Err(e) => issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidValue,
                format!("{}: {}", label, e),
            )),
        }

        if let Err(e) = self.parse_split_method() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidValue,
                format!("{}: {}", label, e),
            ));
        }

        let debate_only = [
            ("rounds", self.rounds.is_some()),
            ("voting", self.voting.is_some()),
            ("moderator", self.moderator.is_some()),
            ("moderator_guidance", self.moderator_guidance),
            ("structured_proposals", self.structured_proposals),
        ];
        ignored(label, "parallel", &debate_only, issues);
    }
}

fn unknown_agent(label: &str, name: &str) -> ConfigIssue {
    ConfigIssue::error(
        ConfigIssueCode::UnknownAgent,
        format!("{}: agent '{}' is not defined in [[agents]]", label, name),
    )
}

fn ignored(label: &str, kind: &str, options: &[(&str, bool)], issues: &mut Vec<ConfigIssue>) {
    for (option, set) in options {
        if *set {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::IgnoredOption,
                format!("{}: '{}' has no effect on {} stages", label, option, kind),
            ));
        }
    }
}
