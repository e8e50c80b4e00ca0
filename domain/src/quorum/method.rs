//! Voting methods for debate winner selection.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// How a debate picks its winning proposal.
///
/// - `Majority`: every agent votes, highest count wins (default)
/// - `Weighted`: votes count by the voter's expertise level
/// - `Consensus`: identical latest proposals win without a vote
/// - `Moderator`: a designated agent chooses
///
/// # Example
///
/// ```
/// use council_domain::quorum::VotingMethod;
///
/// let method: VotingMethod = "weighted".parse().unwrap();
/// assert_eq!(method, VotingMethod::Weighted);
/// assert!(VotingMethod::Moderator.requires_moderator());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VotingMethod {
    #[default]
    Majority,
    Weighted,
    Consensus,
    Moderator,
}

impl VotingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VotingMethod::Majority => "majority",
            VotingMethod::Weighted => "weighted",
            VotingMethod::Consensus => "consensus",
            VotingMethod::Moderator => "moderator",
        }
    }

    /// Human-readable description of this method
    pub fn description(&self) -> &'static str {
        match self {
            VotingMethod::Majority => "majority vote (first declared wins ties)",
            VotingMethod::Weighted => "vote weighted by expertise level",
            VotingMethod::Consensus => "consensus, falling back to majority vote",
            VotingMethod::Moderator => "moderator selection",
        }
    }

    pub fn requires_moderator(&self) -> bool {
        matches!(self, VotingMethod::Moderator)
    }

    /// Whether agents are polled with a voting prompt.
    pub fn collects_votes(&self) -> bool {
        matches!(
            self,
            VotingMethod::Majority | VotingMethod::Weighted | VotingMethod::Consensus
        )
    }
}

impl std::fmt::Display for VotingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VotingMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(VotingMethod::Majority),
            "weighted" => Ok(VotingMethod::Weighted),
            "consensus" => Ok(VotingMethod::Consensus),
            "moderator" => Ok(VotingMethod::Moderator),
            _ => Err(DomainError::UnknownVotingMethod(s.to_string())),
        }
    }
}
