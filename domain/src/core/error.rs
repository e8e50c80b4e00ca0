//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown voting strategy: {0}. Valid: majority, weighted, consensus, moderator")]
    UnknownVotingMethod(String),

    #[error("Unknown error strategy: {0}. Valid: halt, continue, retry, fallback")]
    UnknownErrorStrategy(String),

    #[error("Unknown split method: {0}. Valid: auto, by_lines")]
    UnknownSplitMethod(String),

    #[error("Duplicate proposal key: {0}")]
    DuplicateProposal(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
