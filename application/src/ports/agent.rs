//! Agent port
//!
//! Defines the interface every council participant implements. Agents are
//! opaque text-in/text-out capabilities; adapters live in the infrastructure
//! layer (subprocess agents) or in callers' code.

use async_trait::async_trait;
use council_domain::quorum::DEFAULT_VOTE_WEIGHT;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Capability key read for weighted voting and load balancing.
pub const EXPERTISE_LEVEL: &str = "expertise_level";

/// Errors that can occur while an agent works on a task
#[derive(Error, Debug)]
pub enum AgentError {
    /// The agent reported a failure; the message is shown verbatim
    #[error("{0}")]
    Failed(String),

    #[error("Agent '{agent}' timed out after {elapsed:?}")]
    Timeout { agent: String, elapsed: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl AgentError {
    pub fn failed(message: impl Into<String>) -> Self {
        AgentError::Failed(message.into())
    }
}

/// A council participant.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use council_application::ports::agent::{Agent, AgentError};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Agent for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn work_on(&self, task: &str) -> Result<String, AgentError> {
///         Ok(task.to_string())
///     }
/// }
///
/// assert_eq!(Echo.expertise_level(), 0.5);
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique name within a stage
    fn name(&self) -> &str;

    /// Convert a text task into a text response
    async fn work_on(&self, task: &str) -> Result<String, AgentError>;

    /// Free-form capability map (e.g. `expertise_level`)
    fn capabilities(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Numeric capability, if present
    fn capability(&self, key: &str) -> Option<f64> {
        self.capabilities().get(key).and_then(Value::as_f64)
    }

    /// Voting weight, defaults to 0.5
    fn expertise_level(&self) -> f64 {
        self.capability(EXPERTISE_LEVEL)
            .unwrap_or(DEFAULT_VOTE_WEIGHT)
    }
}

/// Agents are shared between stages and never copied by value.
pub type SharedAgent = Arc<dyn Agent>;

/// Names of `agents` in declaration order.
pub fn agent_names(agents: &[SharedAgent]) -> Vec<String> {
    agents.iter().map(|a| a.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Expert(f64);

    #[async_trait]
    impl Agent for Expert {
        fn name(&self) -> &str {
            "expert"
        }

        async fn work_on(&self, _task: &str) -> Result<String, AgentError> {
            Ok(String::new())
        }

        fn capabilities(&self) -> Map<String, Value> {
            let mut caps = Map::new();
            caps.insert(EXPERTISE_LEVEL.to_string(), json!(self.0));
            caps.insert("domain".to_string(), json!("security"));
            caps
        }
    }

    #[test]
    fn test_expertise_level_from_capabilities() {
        assert_eq!(Expert(0.9).expertise_level(), 0.9);
        assert_eq!(Expert(0.9).capability("domain"), None);
        assert_eq!(Expert(0.9).capability("missing"), None);
    }

    #[test]
    fn test_failed_message_is_verbatim() {
        assert_eq!(AgentError::failed("rate limited").to_string(), "rate limited");
    }

    #[test]
    fn test_timeout_message() {
        let err = AgentError::Timeout {
            agent: "slow".to_string(),
            elapsed: Duration::from_secs(3),
        };
        assert_eq!(err.to_string(), "Agent 'slow' timed out after 3s");
    }
}
