//! Debate decision domain
//!
//! Pure logic used by debate stages to decide on a winning proposal.
//!
//! # Flow
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌────────────┐   ┌──────────────┐
//! │ Proposals  │ → │ Revisions   │ → │ Ballots    │ → │ VoteTally    │
//! │ (original) │   │ (_round_n)  │   │ parse_vote │   │ winner + meta│
//! └────────────┘   └─────────────┘   └────────────┘   └──────────────┘
//!        │                                                  ↑
//!        └── check_consensus / select_by_moderator ─────────┘
//! ```
//!
//! Only original proposals (no round suffix) are eligible to win; revisions
//! feed the debate prompts and the consensus check.

pub mod consensus;
pub mod method;
pub mod parsing;
pub mod proposal;
pub mod vote;

pub use consensus::{CONSENSUS_PREFIX_CHARS, check_consensus};
pub use method::VotingMethod;
pub use parsing::{MODERATOR_PREFIX_CHARS, VoteChoice, parse_vote, select_by_moderator};
pub use proposal::{Proposal, ProposalSet, round_key};
pub use vote::{Ballot, DEFAULT_VOTE_WEIGHT, ProposalCount, TallyWinner, VoteTally};
