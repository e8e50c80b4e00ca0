//! Council facade
//!
//! [`Council`] bundles the stages, the error policy, moderator assignment and
//! the shared [`Context`]. A council owns its context across runs, so a
//! second `execute` sees the results of the first one.

use crate::config::ErrorPolicy;
use crate::error::CouncilError;
use crate::ports::agent::SharedAgent;
use crate::ports::event_sink::{EventSink, NoEvents};
use crate::use_cases::moderator::ModeratorAssigner;
use crate::use_cases::orchestrator::StepOrchestrator;
use crate::use_cases::stage::Stage;
use council_domain::{Context, CouncilReport};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// A configured pipeline of stages plus shared context.
#[derive(Debug)]
pub struct Council {
    orchestrator: StepOrchestrator,
    moderators: ModeratorAssigner,
    context: Context,
}

impl Council {
    pub fn builder(name: impl Into<String>) -> CouncilBuilder {
        CouncilBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        self.orchestrator.name()
    }

    pub fn stages(&self) -> &[Stage] {
        self.orchestrator.stages()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Distinct agent names across all stages, in first-seen order.
    pub fn agent_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for stage in self.orchestrator.stages() {
            for agent in stage.agents() {
                if !names.iter().any(|n| n == agent.name()) {
                    names.push(agent.name().to_string());
                }
            }
        }
        names
    }

    pub async fn execute(&mut self, task: &str) -> Result<CouncilReport, CouncilError> {
        self.execute_with_cancel(task, &CancellationToken::new()).await
    }

    /// Run every stage; `cancel` aborts in-flight agent calls and backoff.
    pub async fn execute_with_cancel(
        &mut self,
        task: &str,
        cancel: &CancellationToken,
    ) -> Result<CouncilReport, CouncilError> {
        let assigned = self.moderators.assign(self.orchestrator.stages_mut());
        if assigned > 0 {
            info!("Assigned moderators to {} debate stages", assigned);
        }

        self.orchestrator
            .execute_steps(task, &mut self.context, cancel)
            .await?;

        Ok(CouncilReport::from_context(
            self.name(),
            task,
            self.agent_names(),
            &self.context,
        ))
    }
}

/// Builder for [`Council`].
pub struct CouncilBuilder {
    name: String,
    stages: Vec<Stage>,
    policy: ErrorPolicy,
    events: Arc<dyn EventSink>,
    moderators: ModeratorAssigner,
    context: Option<Context>,
}

impl CouncilBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            policy: ErrorPolicy::default(),
            events: Arc::new(NoEvents),
            moderators: ModeratorAssigner::default(),
            context: None,
        }
    }

    pub fn stage(mut self, stage: impl Into<Stage>) -> Self {
        self.stages.push(stage.into());
        self
    }

    pub fn stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.stages.extend(stages);
        self
    }

    pub fn policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn moderators(mut self, moderators: ModeratorAssigner) -> Self {
        self.moderators = moderators;
        self
    }

    /// Shorthand for a pool-less assigner with a default moderator.
    pub fn default_moderator(mut self, moderator: SharedAgent) -> Self {
        self.moderators = ModeratorAssigner::new(Some(moderator));
        self
    }

    /// Start from an existing context instead of an empty one.
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn build(self) -> Council {
        Council {
            orchestrator: StepOrchestrator::new(self.name, self.stages)
                .with_policy(self.policy)
                .with_events(self.events),
            moderators: self.moderators,
            context: self.context.unwrap_or_default(),
        }
    }
}
