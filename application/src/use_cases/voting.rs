//! Winner selection for debates.
//!
//! Ballot collection for majority and weighted votes, and moderator
//! selection. Consensus detection lives in the debate itself since it runs
//! between rounds; it only falls back to a majority vote here.

use crate::error::CouncilError;
use crate::ports::agent::SharedAgent;
use crate::use_cases::shared::{AgentCall, all_or_first_error, current_time, fan_out};
use council_domain::core::string::truncate;
use council_domain::quorum::{
    Ballot, ProposalSet, TallyWinner, VoteChoice, VoteTally, parse_vote, select_by_moderator,
};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Characters of each proposal shown in the voting prompt.
pub const VOTING_PREVIEW_CHARS: usize = 200;

/// Characters of each proposal shown to the moderator.
pub const MODERATOR_PREVIEW_CHARS: usize = 300;

/// The selected proposal and the metadata explaining the choice.
#[derive(Debug, Clone)]
pub struct Decision {
    pub key: String,
    pub text: String,
    pub metadata: Map<String, Value>,
}

impl Decision {
    fn from_winner(winner: TallyWinner, metadata: Map<String, Value>) -> Self {
        Self {
            key: winner.key,
            text: winner.text,
            metadata,
        }
    }
}

/// How ballots are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotWeight {
    /// Every ballot counts once
    Equal,
    /// Ballots carry the voter's `expertise_level`
    Expertise,
}

pub fn voting_prompt(proposals: &ProposalSet) -> String {
    let mut prompt = format!(
        "Current date and time: {}\n\n\
         Vote for the best proposal. Reply with 'I vote for: [agent name]' or \
         'I abstain from voting'\n\n",
        current_time()
    );
    for proposal in proposals.originals() {
        prompt.push_str(&format!(
            "{}: {}\n\n",
            proposal.key,
            truncate(&proposal.text, VOTING_PREVIEW_CHARS)
        ));
    }
    prompt
}

/// Ask every agent for a ballot and parse the replies.
///
/// With `allow_self_votes` off, a ballot for the voter's own proposal is
/// turned into an abstention.
pub async fn collect_ballots(
    agents: &[SharedAgent],
    proposals: &ProposalSet,
    weight: BallotWeight,
    allow_self_votes: bool,
    cancel: &CancellationToken,
) -> Result<Vec<Ballot>, CouncilError> {
    let prompt = voting_prompt(proposals);
    let calls = agents
        .iter()
        .map(|agent| AgentCall::new(agent, prompt.clone()))
        .collect();
    let replies = all_or_first_error(fan_out(calls, cancel).await?)?;

    Ok(agents
        .iter()
        .zip(replies)
        .map(|(agent, reply)| {
            let mut choice = parse_vote(&reply, proposals);
            if !allow_self_votes && choice.proposal_key() == Some(agent.name()) {
                debug!("Discarding self-vote from {}", agent.name());
                choice = VoteChoice::Abstain;
            }
            debug!("Ballot from {}: {:?}", agent.name(), choice);

            let ballot = Ballot::new(agent.name(), choice);
            match weight {
                BallotWeight::Equal => ballot,
                BallotWeight::Expertise => ballot.with_weight(agent.expertise_level()),
            }
        })
        .collect())
}

/// Majority or weighted vote among all agents.
pub async fn vote(
    agents: &[SharedAgent],
    proposals: &ProposalSet,
    weight: BallotWeight,
    allow_self_votes: bool,
    cancel: &CancellationToken,
) -> Result<Decision, CouncilError> {
    let ballots = collect_ballots(agents, proposals, weight, allow_self_votes, cancel).await?;
    let tally = VoteTally::count(proposals, &ballots);

    let winner = match weight {
        BallotWeight::Equal => tally.majority_winner(),
        BallotWeight::Expertise => tally.weighted_winner(),
    }
    .ok_or_else(|| CouncilError::Strategy("no proposals to vote on".to_string()))?;

    info!(
        "Vote winner: {} ({} votes, {} abstentions{})",
        winner.key,
        tally.total_votes(),
        tally.abstentions(),
        if winner.tie { ", tie" } else { "" }
    );

    let metadata = match weight {
        BallotWeight::Equal => tally.majority_metadata(&winner),
        BallotWeight::Expertise => tally.weighted_metadata(&winner),
    };
    Ok(Decision::from_winner(winner, metadata))
}

pub fn moderator_prompt(task: &str, proposals: &ProposalSet) -> String {
    let mut prompt = format!("Select the best proposal for: {}\n\nProposals:\n", task);
    for proposal in proposals.originals() {
        prompt.push_str(&format!(
            "\n{}: {}\n",
            proposal.key,
            truncate(&proposal.text, MODERATOR_PREVIEW_CHARS)
        ));
    }
    prompt
}

/// Let the moderator pick a proposal.
///
/// An unrecognisable reply selects the first proposal with
/// `moderatorMatched: false`.
pub async fn moderate(
    moderator: &SharedAgent,
    task: &str,
    proposals: &ProposalSet,
    cancel: &CancellationToken,
) -> Result<Decision, CouncilError> {
    let calls = vec![AgentCall::new(moderator, moderator_prompt(task, proposals))];
    let reply = all_or_first_error(fan_out(calls, cancel).await?)?
        .into_iter()
        .next()
        .unwrap_or_default();

    let (selected, matched) = match select_by_moderator(&reply, proposals) {
        Some(p) => (p, true),
        None => (
            proposals
                .first_original()
                .ok_or_else(|| CouncilError::Strategy("no proposals to moderate".to_string()))?,
            false,
        ),
    };
    info!(
        "Moderator {} selected {} (matched: {})",
        moderator.name(),
        selected.key,
        matched
    );

    let mut metadata = Map::new();
    metadata.insert("selectedBy".to_string(), Value::from("moderator"));
    metadata.insert("moderator".to_string(), Value::from(moderator.name()));
    metadata.insert("moderatorMatched".to_string(), Value::Bool(matched));

    Ok(Decision {
        key: selected.key.clone(),
        text: selected.text.clone(),
        metadata,
    })
}
