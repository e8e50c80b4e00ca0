//! Stage configuration
//!
//! A council is an ordered list of [`Stage`]s. Dispatch is a plain `match`
//! over the two stage types.

use crate::error::CouncilError;
use crate::ports::agent::SharedAgent;
use crate::use_cases::debate::DebateStage;
use crate::use_cases::parallel::ParallelStage;
use council_domain::{ConfigIssue, ConfigIssueCode, Context, StageKind, StageResult};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub enum Stage {
    Parallel(ParallelStage),
    Debate(DebateStage),
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Parallel(_) => StageKind::Parallel,
            Stage::Debate(_) => StageKind::Debate,
        }
    }

    pub fn agents(&self) -> &[SharedAgent] {
        match self {
            Stage::Parallel(stage) => stage.agents(),
            Stage::Debate(stage) => stage.agents(),
        }
    }

    pub fn as_debate_mut(&mut self) -> Option<&mut DebateStage> {
        match self {
            Stage::Debate(stage) => Some(stage),
            Stage::Parallel(_) => None,
        }
    }

    /// Configuration problems, without side effects.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        match self {
            Stage::Parallel(stage) => stage.validate(),
            Stage::Debate(stage) => stage.validate(),
        }
    }

    pub async fn execute(
        &self,
        task: &str,
        context: &Context,
        cancel: &CancellationToken,
    ) -> Result<StageResult, CouncilError> {
        match self {
            Stage::Parallel(stage) => stage.execute(task, context, cancel).await,
            Stage::Debate(stage) => stage.execute(task, context, cancel).await,
        }
    }
}

impl From<ParallelStage> for Stage {
    fn from(stage: ParallelStage) -> Self {
        Stage::Parallel(stage)
    }
}

impl From<DebateStage> for Stage {
    fn from(stage: DebateStage) -> Self {
        Stage::Debate(stage)
    }
}

/// Checks shared by every stage type: at least one agent, unique names.
pub(crate) fn validate_agents(agents: &[SharedAgent]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if agents.is_empty() {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::NoAgents,
            "stage has no agents",
        ));
    }

    let mut seen = HashSet::new();
    for agent in agents {
        if !seen.insert(agent.name()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicateAgent,
                format!("agent '{}' appears more than once in the stage", agent.name()),
            ));
        }
    }

    issues
}
