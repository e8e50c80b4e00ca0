//! Error handler
//!
//! Wraps one stage invocation and applies the council's [`ErrorPolicy`] when
//! it fails: halt, continue with a substitute, retry with exponential
//! backoff, or delegate to a fallback handler.

use crate::config::ErrorPolicy;
use crate::error::CouncilError;
use crate::ports::event_sink::EventSink;
use crate::ports::fallback::FailedStage;
use crate::use_cases::shared::check_cancelled;
use council_domain::{Context, CouncilEvent, ErrorStrategy, StageKind, StageResult};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// The stage invocation being guarded.
#[derive(Debug, Clone, Copy)]
pub struct StepInvocation<'a> {
    pub index: usize,
    pub kind: StageKind,
    pub task: &'a str,
    pub context: &'a Context,
}

/// Applies an [`ErrorPolicy`] to stage invocations.
///
/// Attempt counting is per invocation: every call to [`ErrorHandler::run`]
/// starts at attempt 0.
pub struct ErrorHandler<'a> {
    policy: &'a ErrorPolicy,
    events: &'a dyn EventSink,
}

impl<'a> ErrorHandler<'a> {
    pub fn new(policy: &'a ErrorPolicy, events: &'a dyn EventSink) -> Self {
        Self { policy, events }
    }

    /// Run `attempt_stage` under the policy.
    ///
    /// Configuration errors and cancellation always propagate. Every failure
    /// emits `step:error` before the policy decides what to do with it.
    pub async fn run<F, Fut>(
        &self,
        step: StepInvocation<'_>,
        cancel: &CancellationToken,
        mut attempt_stage: F,
    ) -> Result<StageResult, CouncilError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<StageResult, CouncilError>>,
    {
        let strategy = self.policy.strategy;
        let mut attempt: u32 = 0;

        loop {
            check_cancelled(cancel)?;

            let err = match attempt_stage().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!("Stage {} succeeded after {} retries", step.index, attempt);
                        self.events.emit(&CouncilEvent::StepRetrySuccess {
                            step: step.index,
                            attempts: attempt + 1,
                        });
                    }
                    return Ok(result);
                }
                Err(e) => e,
            };

            self.events.emit(&CouncilEvent::StepError {
                step: step.index,
                kind: step.kind,
                error: err.to_string(),
                attempt,
                strategy,
            });

            if err.is_fatal() {
                error!("Stage {} failed fatally: {}", step.index, err);
                return Err(err);
            }

            match strategy {
                ErrorStrategy::Halt => {
                    error!("Stage {} failed, halting: {}", step.index, err);
                    return Err(err);
                }
                ErrorStrategy::Continue => {
                    warn!("Stage {} failed, continuing: {}", step.index, err);
                    return Ok(skipped_result(step.index, &err));
                }
                ErrorStrategy::Retry => {
                    if attempt >= self.policy.max_retries {
                        error!(
                            "Stage {} failed after {} attempts: {}",
                            step.index,
                            attempt + 1,
                            err
                        );
                        return Err(err);
                    }

                    let delay = self.policy.backoff_for(attempt);
                    warn!(
                        "Stage {} failed (attempt {}), retrying in {:?}: {}",
                        step.index,
                        attempt + 1,
                        delay,
                        err
                    );
                    self.events.emit(&CouncilEvent::StepRetry {
                        step: step.index,
                        attempt: attempt + 1,
                        delay_ms: millis(delay),
                    });

                    tokio::select! {
                        _ = cancel.cancelled() => return Err(CouncilError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                ErrorStrategy::Fallback => return self.fallback(step, err).await,
            }
        }
    }

    async fn fallback(
        &self,
        step: StepInvocation<'_>,
        err: CouncilError,
    ) -> Result<StageResult, CouncilError> {
        let Some(handler) = &self.policy.fallback else {
            warn!("Stage {} failed with no fallback handler: {}", step.index, err);
            self.events.emit(&CouncilEvent::StepFallback {
                step: step.index,
                handler: false,
            });
            let mut result = skipped_result(step.index, &err)
                .with_meta("fallback", "false-no-handler");
            result.output.push_str(" (no fallback available)");
            return Ok(result);
        };

        warn!("Stage {} failed, using fallback handler: {}", step.index, err);
        self.events.emit(&CouncilEvent::StepFallback {
            step: step.index,
            handler: true,
        });

        handler
            .handle(FailedStage {
                index: step.index,
                kind: step.kind,
                error: &err,
                task: step.task,
                context: step.context,
            })
            .await
    }
}

/// Whole milliseconds in `delay`, saturating at `u64::MAX`.
fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Substitute result recorded for an absorbed failure.
fn skipped_result(index: usize, err: &CouncilError) -> StageResult {
    StageResult::failure(format!("stage failed: {}", err))
        .with_meta("error", err.to_string())
        .with_meta("skipped", true)
        .with_meta("stepIndex", index)
}
