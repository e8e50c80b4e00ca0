//! Domain layer for council
//!
//! This crate contains the pure logic of a council run: shared context,
//! stage results, proposal bookkeeping, vote parsing and tallying, lifecycle
//! events and the final report. It has no dependencies on an async runtime,
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is a pipeline of stages run strictly in order over a shared
//! [`Context`]. Each stage is either:
//!
//! - **Parallel**: agents work concurrently and their outputs are merged
//! - **Debate**: agents propose, revise over rounds, then a [`VotingMethod`]
//!   picks the winner
//!
//! ## Error Strategy
//!
//! [`ErrorStrategy`] decides what a failed stage means for the run: halt,
//! continue with a substitute, retry with backoff or ask a fallback handler.

pub mod config;
pub mod context;
pub mod core;
pub mod orchestration;
pub mod quorum;
pub mod stage;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use context::{Context, ContextMetadata, ContextSummary, HistoryAction, HistoryEntry};
pub use core::error::DomainError;
pub use orchestration::{CouncilEvent, CouncilReport, ErrorStrategy, SplitMethod};
pub use stage::{StageKind, StageResult};

// Re-export debate decision types
pub use quorum::{
    Ballot, ProposalSet, TallyWinner, VoteChoice, VoteTally, VotingMethod, check_consensus,
    parse_vote, select_by_moderator,
};
