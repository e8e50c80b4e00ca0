//! Vote and selection parsing for debates.
//!
//! These functions map free-form agent replies onto proposals. They are pure
//! text matching and never fail: anything unrecognised becomes an abstention
//! or a default winner upstream.
//!
//! | Function | Use Case | Pattern |
//! |----------|----------|---------|
//! | [`parse_vote`] | Majority / weighted ballots | `I vote for: <name>` or `abstain` |
//! | [`select_by_moderator`] | Moderator selection | proposal key or text prefix |

use super::proposal::{Proposal, ProposalSet};
use crate::core::string::take_chars;

/// Phrase introducing a ballot in a voting reply.
pub const VOTE_MARKER: &str = "i vote for:";

/// Characters of a proposal a moderator reply may quote to select it.
pub const MODERATOR_PREFIX_CHARS: usize = 50;

/// Outcome of parsing one voting reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteChoice {
    /// Vote for the original proposal with this key
    Proposal(String),
    /// Voter explicitly abstained
    Abstain,
    /// Reply could not be matched to any proposal
    NoMatch,
}

impl VoteChoice {
    pub fn proposal_key(&self) -> Option<&str> {
        match self {
            VoteChoice::Proposal(key) => Some(key),
            _ => None,
        }
    }
}

/// Parse a voting reply against the original proposals.
///
/// 1. A reply mentioning `abstain` anywhere is an abstention.
/// 2. Otherwise the text following `I vote for:` up to the end of that line
///    is matched to the first original proposal whose key appears in it.
///    Only when no key appears is it matched by text: the first original
///    whose text appears in it, or whose text contains it.
/// 3. Anything else is [`VoteChoice::NoMatch`].
///
/// Matching ignores ASCII case.
///
/// ```
/// use council_domain::quorum::{parse_vote, ProposalSet, VoteChoice};
///
/// let mut proposals = ProposalSet::new();
/// proposals.insert_original("alice", "use a cache").unwrap();
/// proposals.insert_original("bob", "add an index").unwrap();
///
/// assert_eq!(parse_vote("I vote for: Bob", &proposals), VoteChoice::Proposal("bob".into()));
/// assert_eq!(parse_vote("I abstain from voting", &proposals), VoteChoice::Abstain);
/// assert_eq!(parse_vote("both are fine", &proposals), VoteChoice::NoMatch);
/// ```
pub fn parse_vote(response: &str, proposals: &ProposalSet) -> VoteChoice {
    // ASCII lowering keeps byte offsets aligned with `response`
    let lowered = response.to_ascii_lowercase();

    if lowered.contains("abstain") {
        return VoteChoice::Abstain;
    }

    let Some(start) = lowered.find(VOTE_MARKER) else {
        return VoteChoice::NoMatch;
    };

    let rest = &lowered[start + VOTE_MARKER.len()..];
    let candidate = rest.lines().next().unwrap_or("").trim();
    if candidate.is_empty() {
        return VoteChoice::NoMatch;
    }

    proposals
        .originals()
        .find(|p| candidate.contains(&p.key.to_ascii_lowercase()))
        .or_else(|| proposals.originals().find(|p| matches_text(p, candidate)))
        .map(|p| VoteChoice::Proposal(p.key.clone()))
        .unwrap_or(VoteChoice::NoMatch)
}

fn matches_text(proposal: &Proposal, candidate: &str) -> bool {
    let text = proposal.text.to_ascii_lowercase();
    !text.is_empty() && (candidate.contains(&text) || text.contains(candidate))
}

/// Pick the original proposal a moderator's reply refers to.
///
/// The first original (declaration order) whose key or first
/// [`MODERATOR_PREFIX_CHARS`] characters appear in the reply wins. Returns
/// `None` when nothing matches.
pub fn select_by_moderator<'a>(response: &str, proposals: &'a ProposalSet) -> Option<&'a Proposal> {
    let lowered = response.to_lowercase();

    proposals.originals().find(|p| {
        if lowered.contains(&p.key.to_lowercase()) {
            return true;
        }
        let prefix = take_chars(&p.text, MODERATOR_PREFIX_CHARS).to_lowercase();
        !prefix.trim().is_empty() && lowered.contains(&prefix)
    })
}
