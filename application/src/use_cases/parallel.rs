//! Parallel stage
//!
//! Every agent works concurrently on its own prompt; the outputs are merged
//! into one result according to a [`ParallelStrategy`].

use crate::error::CouncilError;
use crate::ports::agent::{EXPERTISE_LEVEL, SharedAgent, agent_names};
use crate::use_cases::shared::{AgentCall, all_or_first_error, fan_out};
use crate::use_cases::stage::validate_agents;
use council_domain::{ConfigIssue, ConfigIssueCode, Context, SplitMethod, StageResult};
use serde_json::{Map, json};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Perspectives used by [`ParallelStrategy::domain_split`].
pub const DEFAULT_DOMAINS: [&str; 4] = ["technical", "business", "user", "security"];

/// Capability values above this get the comprehensive prompt suffix.
pub const HIGH_CAPABILITY_THRESHOLD: f64 = 0.7;

/// Load factor for agents that do not report the capability.
pub const DEFAULT_LOAD_FACTOR: f64 = 1.0;

/// Custom task splitter: `(task, agent_count) -> subtasks`.
///
/// Must return exactly `agent_count` subtasks.
pub type TaskSplitter = Arc<dyn Fn(&str, usize) -> Vec<String> + Send + Sync>;

/// How work is assigned to agents and how their outputs are merged.
#[derive(Clone, Default)]
pub enum ParallelStrategy {
    /// Same task for everyone, labeled concatenation
    #[default]
    Uniform,
    /// Agent i analyses the task from `domains[i % len]`
    DomainSplit { domains: Vec<String> },
    /// The task is split into one subtask per agent
    TaskSplit { method: SplitMethod },
    /// Prompt depth follows each agent's capability value
    LoadBalanced { capability_key: String },
    /// Uniform fan-out, then `synthesizer` summarises all outputs
    Synthesis { synthesizer: SharedAgent },
}

impl ParallelStrategy {
    pub fn domain_split() -> Self {
        ParallelStrategy::DomainSplit {
            domains: DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn domains(domains: Vec<String>) -> Self {
        ParallelStrategy::DomainSplit { domains }
    }

    pub fn task_split(method: SplitMethod) -> Self {
        ParallelStrategy::TaskSplit { method }
    }

    pub fn load_balanced() -> Self {
        ParallelStrategy::LoadBalanced {
            capability_key: EXPERTISE_LEVEL.to_string(),
        }
    }

    pub fn synthesis(synthesizer: SharedAgent) -> Self {
        ParallelStrategy::Synthesis { synthesizer }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParallelStrategy::Uniform => "uniform",
            ParallelStrategy::DomainSplit { .. } => "domain_split",
            ParallelStrategy::TaskSplit { .. } => "task_split",
            ParallelStrategy::LoadBalanced { .. } => "load_balanced",
            ParallelStrategy::Synthesis { .. } => "synthesis",
        }
    }
}

impl std::fmt::Debug for ParallelStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParallelStrategy::Uniform => write!(f, "Uniform"),
            ParallelStrategy::DomainSplit { domains } => {
                f.debug_struct("DomainSplit").field("domains", domains).finish()
            }
            ParallelStrategy::TaskSplit { method } => {
                f.debug_struct("TaskSplit").field("method", method).finish()
            }
            ParallelStrategy::LoadBalanced { capability_key } => f
                .debug_struct("LoadBalanced")
                .field("capability_key", capability_key)
                .finish(),
            ParallelStrategy::Synthesis { synthesizer } => f
                .debug_struct("Synthesis")
                .field("synthesizer", &synthesizer.name())
                .finish(),
        }
    }
}

/// One agent's slot in the fan-out.
struct Assignment {
    /// Label in `parallelResults` and the merged output
    key: String,
    body: String,
}

/// A stage where agents work concurrently.
///
/// Per-agent failures are recorded in `parallelResults`. The stage itself
/// only fails when every agent failed, when `require_all` is set and any
/// agent failed, or when the strategy cannot produce its assignments.
#[derive(Clone)]
pub struct ParallelStage {
    agents: Vec<SharedAgent>,
    strategy: ParallelStrategy,
    splitter: Option<TaskSplitter>,
    require_all: bool,
}

impl ParallelStage {
    pub fn new(agents: Vec<SharedAgent>) -> Self {
        Self {
            agents,
            strategy: ParallelStrategy::default(),
            splitter: None,
            require_all: false,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_strategy(mut self, strategy: ParallelStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_splitter<F>(mut self, splitter: F) -> Self
    where
        F: Fn(&str, usize) -> Vec<String> + Send + Sync + 'static,
    {
        self.splitter = Some(Arc::new(splitter));
        self
    }

    pub fn with_require_all(mut self, require_all: bool) -> Self {
        self.require_all = require_all;
        self
    }

    // ==================== Accessors ====================

    pub fn agents(&self) -> &[SharedAgent] {
        &self.agents
    }

    pub fn strategy(&self) -> &ParallelStrategy {
        &self.strategy
    }

    pub fn requires_all(&self) -> bool {
        self.require_all
    }

    /// Check the stage configuration without side effects.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = validate_agents(&self.agents);

        if let ParallelStrategy::DomainSplit { domains } = &self.strategy {
            if domains.is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidValue,
                    "domain_split strategy needs at least one domain",
                ));
            }
        }

        issues
    }

    // ==================== Execution ====================

    pub async fn execute(
        &self,
        task: &str,
        context: &Context,
        cancel: &CancellationToken,
    ) -> Result<StageResult, CouncilError> {
        info!(
            "Parallel stage: {} agents, strategy {}",
            self.agents.len(),
            self.strategy.name()
        );

        let assignments = self.assign(task)?;
        let projection = context.prompt_projection();

        let calls = self
            .agents
            .iter()
            .zip(&assignments)
            .map(|(agent, a)| AgentCall::new(agent, format!("{}\n\n{}", a.body, projection)))
            .collect();

        let results = fan_out(calls, cancel).await?;

        let mut parallel_results = Map::new();
        let mut failed_agents = Vec::new();
        let mut outputs: Vec<(String, String)> = Vec::new();
        let mut first_error = None;

        for ((agent, assignment), result) in self.agents.iter().zip(assignments).zip(results) {
            match result {
                Ok(output) => {
                    parallel_results.insert(
                        assignment.key.clone(),
                        json!({ "success": true, "output": output }),
                    );
                    outputs.push((assignment.key, output));
                }
                Err(e) => {
                    warn!("Agent {} failed in parallel stage: {}", agent.name(), e);
                    parallel_results.insert(
                        assignment.key,
                        json!({ "success": false, "error": e.to_string() }),
                    );
                    failed_agents.push(agent.name().to_string());
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(err) = first_error {
            if outputs.is_empty() || self.require_all {
                return Err(err.into());
            }
        }

        let merged = self.merge(task, &outputs, cancel).await?;

        let mut result = StageResult::success(merged)
            .with_meta("parallelResults", parallel_results)
            .with_meta("strategy", self.strategy.name())
            .with_meta("agents", agent_names(&self.agents))
            .with_meta("failedAgents", failed_agents);
        if let ParallelStrategy::Synthesis { synthesizer } = &self.strategy {
            result = result.with_meta("synthesizer", synthesizer.name());
        }
        Ok(result)
    }

    /// Subtasks from the custom splitter, the split method, or the whole task.
    fn subtasks(&self, task: &str) -> Result<Vec<String>, CouncilError> {
        let count = self.agents.len();

        let subtasks = match (&self.splitter, &self.strategy) {
            (Some(splitter), _) => splitter(task, count),
            (None, ParallelStrategy::TaskSplit { method }) => method.split(task, count),
            (None, _) => vec![task.to_string(); count],
        };

        if subtasks.len() != count {
            return Err(CouncilError::Strategy(format!(
                "task splitter returned {} subtasks for {} agents",
                subtasks.len(),
                count
            )));
        }
        Ok(subtasks)
    }

    fn assign(&self, task: &str) -> Result<Vec<Assignment>, CouncilError> {
        if let ParallelStrategy::DomainSplit { domains } = &self.strategy {
            if domains.is_empty() {
                return Err(CouncilError::Strategy(
                    "domain_split strategy has no domains".to_string(),
                ));
            }
        }
        let subtasks = self.subtasks(task)?;

        Ok(self
            .agents
            .iter()
            .zip(subtasks)
            .enumerate()
            .map(|(i, (agent, subtask))| match &self.strategy {
                ParallelStrategy::Uniform | ParallelStrategy::Synthesis { .. } => Assignment {
                    key: agent.name().to_string(),
                    body: subtask,
                },
                ParallelStrategy::DomainSplit { domains } => {
                    let domain = &domains[i % domains.len()];
                    Assignment {
                        key: format!("{} ({})", agent.name(), domain),
                        body: format!("Analyze this from a {} perspective: {}", domain, subtask),
                    }
                }
                ParallelStrategy::TaskSplit { .. } => Assignment {
                    key: format!("Subtask {}", i + 1),
                    body: subtask,
                },
                ParallelStrategy::LoadBalanced { capability_key } => {
                    let factor = agent
                        .capability(capability_key)
                        .unwrap_or(DEFAULT_LOAD_FACTOR);
                    let depth = if factor > HIGH_CAPABILITY_THRESHOLD {
                        "(Provide comprehensive analysis)"
                    } else {
                        "(Focus on key points)"
                    };
                    debug!("Agent {} load factor {:.2}", agent.name(), factor);
                    Assignment {
                        key: agent.name().to_string(),
                        body: format!("{} {}", subtask, depth),
                    }
                }
            })
            .collect())
    }

    async fn merge(
        &self,
        task: &str,
        outputs: &[(String, String)],
        cancel: &CancellationToken,
    ) -> Result<String, CouncilError> {
        let merged = match &self.strategy {
            ParallelStrategy::Uniform => labeled(outputs),
            ParallelStrategy::DomainSplit { .. } => {
                let mut out = String::from("Multi-perspective Analysis:\n");
                for (key, output) in outputs {
                    out.push_str(&format!("\n**{}:**\n{}\n", key, output));
                }
                out
            }
            ParallelStrategy::TaskSplit { .. } => {
                let mut out = String::from("Combined Results:\n");
                for (key, output) in outputs {
                    out.push_str(&format!("\n{}:\n{}", key, output));
                }
                out
            }
            ParallelStrategy::LoadBalanced { .. } => {
                let mut out = String::from("Collaborative Analysis:\n");
                for (key, output) in outputs {
                    out.push_str(&format!("\n[{}]:\n{}", key, output));
                }
                out
            }
            ParallelStrategy::Synthesis { synthesizer } => {
                info!("Synthesizing {} outputs with {}", outputs.len(), synthesizer.name());
                let prompt = format!(
                    "Synthesize the following responses into a single coherent answer.\n\n\
                     Task: {}\n\nResponses:\n\n{}",
                    task,
                    labeled(outputs)
                );
                let results = fan_out(vec![AgentCall::new(synthesizer, prompt)], cancel).await?;
                all_or_first_error(results)?
                    .into_iter()
                    .next()
                    .unwrap_or_default()
            }
        };
        Ok(merged)
    }
}

/// `[key]: output` blocks separated by blank lines.
fn labeled(outputs: &[(String, String)]) -> String {
    outputs
        .iter()
        .map(|(key, output)| format!("[{}]: {}", key, output))
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl std::fmt::Debug for ParallelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelStage")
            .field("agents", &agent_names(&self.agents))
            .field("strategy", &self.strategy)
            .field("splitter", &self.splitter.is_some())
            .field("require_all", &self.require_all)
            .finish()
    }
}
