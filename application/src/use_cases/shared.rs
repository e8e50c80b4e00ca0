//! Shared utilities for use cases.
//!
//! Contains the concurrent agent fan-out used by every stage type and the
//! prompt timestamp helper.

use crate::error::CouncilError;
use crate::ports::agent::{AgentError, SharedAgent};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One prompt addressed to one agent.
pub(crate) struct AgentCall {
    pub agent: SharedAgent,
    pub prompt: String,
}

impl AgentCall {
    pub fn new(agent: &SharedAgent, prompt: impl Into<String>) -> Self {
        Self {
            agent: SharedAgent::clone(agent),
            prompt: prompt.into(),
        }
    }
}

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), CouncilError> {
    if token.is_cancelled() {
        return Err(CouncilError::Cancelled);
    }
    Ok(())
}

/// Run every call concurrently and wait for all of them.
///
/// Results come back in call order regardless of completion order. A
/// panicking agent is reported as [`AgentError::Other`] in its slot.
/// Cancellation aborts the in-flight batch and returns
/// [`CouncilError::Cancelled`].
pub(crate) async fn fan_out(
    calls: Vec<AgentCall>,
    cancel: &CancellationToken,
) -> Result<Vec<Result<String, AgentError>>, CouncilError> {
    check_cancelled(cancel)?;

    let total = calls.len();
    let mut join_set = JoinSet::new();

    for (index, call) in calls.into_iter().enumerate() {
        join_set.spawn(async move {
            let name = call.agent.name().to_string();
            debug!("Agent {} working on prompt ({} chars)", name, call.prompt.len());

            let result = match AssertUnwindSafe(call.agent.work_on(&call.prompt))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(_) => Err(AgentError::Other(format!("agent '{}' panicked", name))),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<Result<String, AgentError>>> = (0..total).map(|_| None).collect();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                join_set.abort_all();
                return Err(CouncilError::Cancelled);
            }
            next = join_set.join_next() => match next {
                Some(Ok((index, result))) => {
                    if let Err(e) = &result {
                        warn!("Agent call {} failed: {}", index, e);
                    }
                    slots[index] = Some(result);
                }
                Some(Err(e)) => {
                    warn!("Task join error: {}", e);
                }
                None => break,
            }
        }
    }

    Ok(slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| Err(AgentError::Other("agent task did not complete".to_string())))
        })
        .collect())
}

/// Collect outputs, or the first error in call order.
pub(crate) fn all_or_first_error(
    results: Vec<Result<String, AgentError>>,
) -> Result<Vec<String>, CouncilError> {
    results
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(CouncilError::from)
}

/// Local wall-clock time as shown to agents in prompts.
pub(crate) fn current_time() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
