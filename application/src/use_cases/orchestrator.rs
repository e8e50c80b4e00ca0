//! Step orchestrator
//!
//! Runs the stages of a council strictly in declaration order, each one
//! guarded by the [`ErrorHandler`], and appends every result to the shared
//! [`Context`] so later stages see it in their prompts.

use crate::config::ErrorPolicy;
use crate::error::CouncilError;
use crate::ports::event_sink::{EventSink, NoEvents};
use crate::use_cases::error_handler::{ErrorHandler, StepInvocation};
use crate::use_cases::stage::Stage;
use council_domain::config::has_errors;
use council_domain::core::string::truncate;
use council_domain::{Context, CouncilEvent, StageResult};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Characters of stage output carried in `step:complete` events.
pub const EVENT_OUTPUT_CHARS: usize = 200;

/// Sink wrapper that swallows panics from the inner sink.
///
/// Wrap sinks in a [`CompositeEventSink`](crate::ports::event_sink::CompositeEventSink)
/// to keep one panicking sink from starving the others.
struct GuardedSink<'a> {
    inner: &'a dyn EventSink,
}

impl EventSink for GuardedSink<'_> {
    fn emit(&self, event: &CouncilEvent) {
        if catch_unwind(AssertUnwindSafe(|| self.inner.emit(event))).is_err() {
            error!("Event sink panicked while handling {}", event.name());
        }
    }
}

/// Sequential stage runner.
pub struct StepOrchestrator {
    name: String,
    stages: Vec<Stage>,
    policy: ErrorPolicy,
    events: Arc<dyn EventSink>,
}

impl StepOrchestrator {
    pub fn new(name: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            name: name.into(),
            stages,
            policy: ErrorPolicy::default(),
            events: Arc::new(NoEvents),
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stages_mut(&mut self) -> &mut [Stage] {
        &mut self.stages
    }

    pub fn policy(&self) -> &ErrorPolicy {
        &self.policy
    }

    /// Run every stage in order.
    ///
    /// Each stage is validated right before it runs; configuration errors
    /// abort before any agent of that stage is called. On a propagated error
    /// the results already added to `context` stay there and no
    /// `council:complete` event is emitted.
    pub async fn execute_steps(
        &self,
        task: &str,
        context: &mut Context,
        cancel: &CancellationToken,
    ) -> Result<Vec<StageResult>, CouncilError> {
        let sink = GuardedSink {
            inner: self.events.as_ref(),
        };
        let handler = ErrorHandler::new(&self.policy, &sink);
        let total = self.stages.len();

        info!("Council '{}' starting {} stages", self.name, total);
        sink.emit(&CouncilEvent::CouncilStart {
            council: self.name.clone(),
            task: task.to_string(),
        });

        let mut results = Vec::with_capacity(total);

        for (index, stage) in self.stages.iter().enumerate() {
            let kind = stage.kind();
            info!("Stage {}/{}: {}", index + 1, total, kind.display_name());
            sink.emit(&CouncilEvent::StepStart { index, kind, total });

            let issues = stage.validate();
            for issue in issues.iter().filter(|i| !i.is_error()) {
                warn!("Stage {}: {}", index, issue.message);
            }
            if has_errors(&issues) {
                let messages: Vec<_> = issues
                    .iter()
                    .filter(|i| i.is_error())
                    .map(|i| i.message.as_str())
                    .collect();
                error!("Stage {} is misconfigured: {}", index, messages.join("; "));
                return Err(CouncilError::Configuration(format!(
                    "stage {}: {}",
                    index,
                    messages.join("; ")
                )));
            }

            let result = {
                let ctx: &Context = context;
                let step = StepInvocation {
                    index,
                    kind,
                    task,
                    context: ctx,
                };
                handler
                    .run(step, cancel, || stage.execute(task, ctx, cancel))
                    .await?
            };

            context.add_result(result.clone());

            let mut summary = result.clone();
            summary.output = truncate(&summary.output, EVENT_OUTPUT_CHARS);
            sink.emit(&CouncilEvent::StepComplete {
                index,
                kind,
                result: summary,
            });

            results.push(result);
        }

        info!("Council '{}' completed {} stages", self.name, results.len());
        sink.emit(&CouncilEvent::CouncilComplete {
            council: self.name.clone(),
            steps_completed: results.len(),
        });

        Ok(results)
    }
}

impl std::fmt::Debug for StepOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepOrchestrator")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .field("policy", &self.policy)
            .finish()
    }
}
