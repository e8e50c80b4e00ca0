//! Council construction from file configuration.
//!
//! Turns a validated [`FileConfig`] into a runnable [`Council`]: one
//! [`CommandAgent`] per `[[agents]]` entry, one stage per `[[stages]]` entry,
//! the error policy and the moderator assigner.

use crate::agents::CommandAgent;
use crate::config::{FileConfig, FileParallelStrategy, FileStageConfig};
use council_application::{
    Council, DebateStage, ErrorPolicy, EventSink, ModeratorAssigner, ParallelStage,
    ParallelStrategy, SharedAgent, Stage,
};
use council_domain::config::has_errors;
use council_domain::{ConfigIssue, Context, DomainError, StageKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors while building a council from configuration
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),

    #[error("agent '{0}' is not defined")]
    UnknownAgent(String),

    #[error("stage {index}: {message}")]
    Stage { index: usize, message: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds councils from a [`FileConfig`].
///
/// Agents defined in the file become [`CommandAgent`]s; [`with_agent`]
/// replaces one by name (useful for tests and embedding).
///
/// [`with_agent`]: CouncilFactory::with_agent
pub struct CouncilFactory<'a> {
    config: &'a FileConfig,
    agents: HashMap<String, SharedAgent>,
}

impl<'a> CouncilFactory<'a> {
    pub fn new(config: &'a FileConfig) -> Self {
        let agents = config
            .agents
            .iter()
            .map(|def| {
                let mut agent = CommandAgent::new(&def.name, &def.command)
                    .with_args(def.args.clone())
                    .with_timeout(Duration::from_secs(def.timeout_secs));
                if let Some(level) = def.expertise_level {
                    agent = agent.with_expertise(level);
                }
                (def.name.clone(), Arc::new(agent) as SharedAgent)
            })
            .collect();

        Self { config, agents }
    }

    /// Use `agent` for its name instead of the configured command.
    pub fn with_agent(mut self, agent: SharedAgent) -> Self {
        self.agents.insert(agent.name().to_string(), agent);
        self
    }

    pub fn agent(&self, name: &str) -> Result<SharedAgent, BuildError> {
        self.agents
            .get(name)
            .cloned()
            .ok_or_else(|| BuildError::UnknownAgent(name.to_string()))
    }

    fn agents_for(&self, names: &[String]) -> Result<Vec<SharedAgent>, BuildError> {
        names.iter().map(|name| self.agent(name)).collect()
    }

    pub fn error_policy(&self) -> Result<ErrorPolicy, BuildError> {
        let council = &self.config.council;
        let strategy = council.error_strategy.parse()?;
        Ok(ErrorPolicy::new(strategy)
            .with_max_retries(council.max_retries)
            .with_backoff_unit(Duration::from_millis(council.backoff_ms)))
    }

    pub fn moderators(&self) -> Result<ModeratorAssigner, BuildError> {
        let council = &self.config.council;
        let default = council
            .default_moderator
            .as_deref()
            .map(|name| self.agent(name))
            .transpose()?;
        let pool = self.agents_for(&council.moderator_pool)?;
        Ok(ModeratorAssigner::new(default).with_pool(pool))
    }

    pub fn stage(&self, index: usize, def: &FileStageConfig) -> Result<Stage, BuildError> {
        let invalid = |message: String| BuildError::Stage { index, message };
        let agents = self.agents_for(&def.agents)?;

        match def.parse_kind().map_err(invalid)? {
            StageKind::Debate => {
                let mut stage = DebateStage::new(agents)
                    .with_voting(def.parse_voting().map_err(invalid)?)
                    .with_moderator_guidance(def.moderator_guidance)
                    .with_self_votes(def.allow_self_votes)
                    .with_structured_proposals(def.structured_proposals);
                if let Some(rounds) = def.rounds {
                    stage = stage.with_rounds(rounds);
                }
                if let Some(moderator) = &def.moderator {
                    stage = stage.with_moderator(self.agent(moderator)?);
                }
                Ok(stage.into())
            }
            StageKind::Parallel => {
                let strategy = match def.parse_strategy().map_err(invalid)? {
                    FileParallelStrategy::Uniform => ParallelStrategy::Uniform,
                    FileParallelStrategy::DomainSplit if def.domains.is_empty() => {
                        ParallelStrategy::domain_split()
                    }
                    FileParallelStrategy::DomainSplit => {
                        ParallelStrategy::domains(def.domains.clone())
                    }
                    FileParallelStrategy::TaskSplit => {
                        ParallelStrategy::task_split(def.parse_split_method().map_err(invalid)?)
                    }
                    FileParallelStrategy::LoadBalanced => match &def.capability_key {
                        Some(key) => ParallelStrategy::LoadBalanced {
                            capability_key: key.clone(),
                        },
                        None => ParallelStrategy::load_balanced(),
                    },
                    FileParallelStrategy::Synthesis => {
                        let name = def.synthesizer.as_deref().ok_or_else(|| {
                            invalid("synthesis strategy requires a synthesizer".to_string())
                        })?;
                        ParallelStrategy::synthesis(self.agent(name)?)
                    }
                };
                Ok(ParallelStage::new(agents)
                    .with_strategy(strategy)
                    .with_require_all(def.require_all)
                    .into())
            }
        }
    }

    /// Validate the configuration and build the council.
    ///
    /// Warnings are logged; any error aborts with [`BuildError::Invalid`]
    /// before an agent is called.
    pub fn build(&self, events: Arc<dyn EventSink>) -> Result<Council, BuildError> {
        let issues = self.config.validate();
        for issue in issues.iter().filter(|i| !i.is_error()) {
            warn!("{}", issue.message);
        }
        if has_errors(&issues) {
            return Err(BuildError::Invalid(
                issues.into_iter().filter(ConfigIssue::is_error).collect(),
            ));
        }

        let stages = self
            .config
            .stages
            .iter()
            .enumerate()
            .map(|(index, def)| self.stage(index, def))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Built {} stages", stages.len());

        let context =
            Context::new().with_projection_limit(self.config.council.projection_limit);

        Ok(Council::builder(&self.config.council.name)
            .stages(stages)
            .policy(self.error_policy()?)
            .moderators(self.moderators()?)
            .events(events)
            .context(context)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use council_application::{Agent, AgentError, NoEvents};
    use council_domain::{ConfigIssueCode, ErrorStrategy, VotingMethod};

    /// Replies with a fixed text.
    struct Fixed {
        name: String,
        reply: String,
    }

    #[async_trait]
    impl Agent for Fixed {
        fn name(&self) -> &str {
            &self.name
        }

        async fn work_on(&self, _task: &str) -> Result<String, AgentError> {
            Ok(self.reply.clone())
        }
    }

    fn fixed(name: &str, reply: &str) -> SharedAgent {
        Arc::new(Fixed {
            name: name.to_string(),
            reply: reply.to_string(),
        })
    }

    fn config(toml_str: &str) -> FileConfig {
        toml::from_str(toml_str).unwrap()
    }

    const PIPELINE: &str = r#"
[council]
name = "pipeline"
error_strategy = "continue"
default_moderator = "lead"

[[agents]]
name = "a"
command = "unused"
expertise_level = 0.9

[[agents]]
name = "b"
command = "unused"

[[agents]]
name = "lead"
command = "unused"

[[stages]]
type = "parallel"
agents = ["a", "b"]
strategy = "synthesis"
synthesizer = "lead"

[[stages]]
type = "debate"
agents = ["a", "b"]
rounds = 0
voting = "moderator"
"#;

    #[test]
    fn test_error_policy_from_config() {
        let config = config(PIPELINE);
        let policy = CouncilFactory::new(&config).error_policy().unwrap();
        assert_eq!(policy.strategy, ErrorStrategy::Continue);
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.backoff_unit, Duration::from_millis(1000));
    }

    #[test]
    fn test_stage_construction() {
        let config = config(PIPELINE);
        let factory = CouncilFactory::new(&config);

        match factory.stage(0, &config.stages[0]).unwrap() {
            Stage::Parallel(stage) => {
                assert_eq!(stage.strategy().name(), "synthesis");
                assert_eq!(stage.agents().len(), 2);
                assert_eq!(stage.agents()[0].expertise_level(), 0.9);
            }
            other => panic!("expected parallel stage, got {:?}", other),
        }
        match factory.stage(1, &config.stages[1]).unwrap() {
            Stage::Debate(stage) => {
                assert_eq!(stage.voting(), VotingMethod::Moderator);
                assert_eq!(stage.rounds(), 0);
                assert!(!stage.has_moderator());
            }
            other => panic!("expected debate stage, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = config(
            r#"
[[agents]]
name = "a"
command = ""

[[stages]]
agents = ["a", "ghost"]
"#,
        );
        let err = CouncilFactory::new(&config)
            .build(Arc::new(NoEvents))
            .unwrap_err();
        match &err {
            BuildError::Invalid(issues) => {
                let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
                assert!(codes.contains(&ConfigIssueCode::MissingCommand));
                assert!(codes.contains(&ConfigIssueCode::UnknownAgent));
            }
            other => panic!("expected invalid config, got {:?}", other),
        }
        assert!(err.to_string().starts_with("invalid configuration:\n  error: "));
    }

    #[tokio::test]
    async fn test_build_and_run_with_injected_agents() {
        let config = config(PIPELINE);
        let mut council = CouncilFactory::new(&config)
            .with_agent(fixed("a", "cache it"))
            .with_agent(fixed("b", "index it"))
            .with_agent(fixed("lead", "b is right"))
            .build(Arc::new(NoEvents))
            .unwrap();

        let report = council.execute("speed up queries").await.unwrap();

        assert_eq!(report.council, "pipeline");
        assert_eq!(report.steps_completed, 2);
        assert_eq!(report.results[0].output, "b is right");
        assert_eq!(report.final_output(), Some("index it"));
        assert_eq!(
            report.results[1].meta("moderator"),
            Some(&serde_json::json!("lead"))
        );
    }
}
