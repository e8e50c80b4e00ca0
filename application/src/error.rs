//! Application error type

use crate::ports::agent::AgentError;
use council_domain::DomainError;
use thiserror::Error;

/// Errors that can occur while running a council
#[derive(Error, Debug)]
pub enum CouncilError {
    /// Invalid stage or council configuration. Never absorbed by an error policy.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An agent call failed; displays the agent's own message
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Strategy code failed (e.g. a splitter produced the wrong subtask count)
    #[error("Strategy error: {0}")]
    Strategy(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl CouncilError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CouncilError::Cancelled)
    }

    /// Fatal errors propagate regardless of the error strategy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CouncilError::Configuration(_) | CouncilError::Cancelled)
    }
}

impl From<DomainError> for CouncilError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Cancelled => CouncilError::Cancelled,
            DomainError::DuplicateProposal(_) => CouncilError::Strategy(err.to_string()),
            other => CouncilError::Configuration(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_is_transparent() {
        let err: CouncilError = AgentError::failed("model overloaded").into();
        assert_eq!(err.to_string(), "model overloaded");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(CouncilError::Configuration("x".to_string()).is_fatal());
        assert!(CouncilError::Cancelled.is_fatal());
        assert!(CouncilError::Cancelled.is_cancelled());
        assert!(!CouncilError::Strategy("x".to_string()).is_fatal());
    }

    #[test]
    fn test_from_domain_error() {
        assert!(CouncilError::from(DomainError::Cancelled).is_cancelled());
        assert!(matches!(
            CouncilError::from(DomainError::DuplicateProposal("a".to_string())),
            CouncilError::Strategy(_)
        ));
        assert!(matches!(
            CouncilError::from(DomainError::UnknownVotingMethod("x".to_string())),
            CouncilError::Configuration(_)
        ));
    }
}
