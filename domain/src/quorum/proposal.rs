//! Ordered proposal collection for a debate.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One candidate text in a debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Unique key: the agent name for originals, `{agent}_round_{n}` for revisions
    pub key: String,
    /// Agent that produced the text
    pub agent: String,
    /// Zero-based debate round, `None` for the initial proposal
    pub round: Option<usize>,
    pub text: String,
}

impl Proposal {
    /// Only initial proposals are eligible to win.
    pub fn is_original(&self) -> bool {
        self.round.is_none()
    }
}

/// Key under which a revision from `agent` in `round` is stored.
pub fn round_key(agent: &str, round: usize) -> String {
    format!("{}_round_{}", agent, round)
}

/// Proposals of one debate execution in insertion order.
///
/// Originals are inserted in agent declaration order, so iteration order
/// doubles as the tie-break order for voting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSet {
    entries: Vec<Proposal>,
}

impl ProposalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the initial proposal of `agent`.
    pub fn insert_original(
        &mut self,
        agent: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), DomainError> {
        let agent = agent.into();
        self.push(Proposal {
            key: agent.clone(),
            agent,
            round: None,
            text: text.into(),
        })
    }

    /// Insert the revision of `agent` for a debate round.
    pub fn insert_revision(
        &mut self,
        agent: impl Into<String>,
        round: usize,
        text: impl Into<String>,
    ) -> Result<(), DomainError> {
        let agent = agent.into();
        self.push(Proposal {
            key: round_key(&agent, round),
            agent,
            round: Some(round),
            text: text.into(),
        })
    }

    fn push(&mut self, proposal: Proposal) -> Result<(), DomainError> {
        if self.get(&proposal.key).is_some() {
            return Err(DomainError::DuplicateProposal(proposal.key));
        }
        self.entries.push(proposal);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Proposal> {
        self.entries.iter().find(|p| p.key == key)
    }

    /// Text of a proposal by key.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).map(|p| p.text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.entries.iter()
    }

    /// Initial proposals in declaration order.
    pub fn originals(&self) -> impl Iterator<Item = &Proposal> {
        self.entries.iter().filter(|p| p.is_original())
    }

    pub fn first_original(&self) -> Option<&Proposal> {
        self.originals().next()
    }

    /// Every key in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|p| p.key.clone()).collect()
    }

    /// Most recent text from `agent` (its last revision, or its original).
    pub fn latest_for(&self, agent: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|p| p.agent == agent)
            .map(|p| p.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_key() {
        assert_eq!(round_key("alice", 0), "alice_round_0");
    }

    #[test]
    fn test_originals_only() {
        let mut set = ProposalSet::new();
        set.insert_original("a", "plan A").unwrap();
        set.insert_original("b", "plan B").unwrap();
        set.insert_revision("a", 0, "plan A2").unwrap();

        let originals: Vec<_> = set.originals().map(|p| p.key.as_str()).collect();
        assert_eq!(originals, vec!["a", "b"]);
        assert_eq!(set.keys(), vec!["a", "b", "a_round_0"]);
        assert_eq!(set.first_original().unwrap().text, "plan A");
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut set = ProposalSet::new();
        set.insert_original("a", "x").unwrap();
        let err = set.insert_original("a", "y").unwrap_err();
        assert_eq!(err, DomainError::DuplicateProposal("a".to_string()));
        assert_eq!(set.text("a"), Some("x"));
    }

    #[test]
    fn test_agent_named_like_round_key_is_still_original() {
        let mut set = ProposalSet::new();
        set.insert_original("x_round_1", "odd name").unwrap();
        assert_eq!(set.originals().count(), 1);
    }

    #[test]
    fn test_latest_for() {
        let mut set = ProposalSet::new();
        set.insert_original("a", "v0").unwrap();
        set.insert_original("b", "w0").unwrap();
        assert_eq!(set.latest_for("a"), Some("v0"));
        set.insert_revision("a", 0, "v1").unwrap();
        set.insert_revision("a", 1, "v2").unwrap();
        assert_eq!(set.latest_for("a"), Some("v2"));
        assert_eq!(set.latest_for("b"), Some("w0"));
        assert_eq!(set.latest_for("c"), None);
    }
}
