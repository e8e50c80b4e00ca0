//! Debate stage
//!
//! ```text
//! [guidance] → proposals → round 0..n (revisions) → winner selection
//!                 │               │                      │
//!                 └── consensus check (consensus voting) ┘
//! ```
//!
//! Every batch fans out to all agents concurrently. Any agent failure fails
//! the stage with that agent's error.

use crate::error::CouncilError;
use crate::ports::agent::{SharedAgent, agent_names};
use crate::use_cases::shared::{AgentCall, all_or_first_error, current_time, fan_out};
use crate::use_cases::stage::validate_agents;
use crate::use_cases::voting::{self, BallotWeight, Decision};
use council_domain::core::string::truncate;
use council_domain::quorum::{ProposalSet, check_consensus};
use council_domain::{ConfigIssue, ConfigIssueCode, Context, StageResult, VotingMethod};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const DEFAULT_ROUNDS: usize = 2;

/// Characters of each proposal quoted in a debate round prompt.
pub const ROUND_PREVIEW_CHARS: usize = 300;

/// A multi-round debate that ends with a single winning proposal.
#[derive(Clone)]
pub struct DebateStage {
    agents: Vec<SharedAgent>,
    moderator: Option<SharedAgent>,
    rounds: usize,
    voting: VotingMethod,
    moderator_guidance: bool,
    allow_self_votes: bool,
    structured_proposals: bool,
}

/// Where a consensus was found, counting the initial proposals as round 1.
struct Consensus {
    agent: String,
    text: String,
    round: usize,
}

impl DebateStage {
    pub fn new(agents: Vec<SharedAgent>) -> Self {
        Self {
            agents,
            moderator: None,
            rounds: DEFAULT_ROUNDS,
            voting: VotingMethod::default(),
            moderator_guidance: false,
            allow_self_votes: true,
            structured_proposals: false,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_moderator(mut self, moderator: SharedAgent) -> Self {
        self.moderator = Some(moderator);
        self
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_voting(mut self, voting: VotingMethod) -> Self {
        self.voting = voting;
        self
    }

    /// Ask the moderator for guidance before the initial proposals.
    pub fn with_moderator_guidance(mut self, enabled: bool) -> Self {
        self.moderator_guidance = enabled;
        self
    }

    pub fn with_self_votes(mut self, allowed: bool) -> Self {
        self.allow_self_votes = allowed;
        self
    }

    /// Request proposals as `Solution / Reasoning / Challenges`.
    pub fn with_structured_proposals(mut self, enabled: bool) -> Self {
        self.structured_proposals = enabled;
        self
    }

    // ==================== Accessors ====================

    pub fn agents(&self) -> &[SharedAgent] {
        &self.agents
    }

    pub fn moderator(&self) -> Option<&SharedAgent> {
        self.moderator.as_ref()
    }

    pub fn has_moderator(&self) -> bool {
        self.moderator.is_some()
    }

    /// Set the moderator unless one is already assigned.
    ///
    /// Returns `true` if the moderator was set.
    pub fn assign_moderator(&mut self, moderator: SharedAgent) -> bool {
        if self.moderator.is_some() {
            return false;
        }
        self.moderator = Some(moderator);
        true
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn voting(&self) -> VotingMethod {
        self.voting
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = validate_agents(&self.agents);

        if self.voting.requires_moderator() && self.moderator.is_none() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingModerator,
                "moderator voting requires a moderator",
            ));
        }
        if self.moderator_guidance && self.moderator.is_none() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::IgnoredOption,
                "moderator guidance is ignored without a moderator",
            ));
        }

        issues
    }

    // ==================== Execution ====================

    pub async fn execute(
        &self,
        task: &str,
        context: &Context,
        cancel: &CancellationToken,
    ) -> Result<StageResult, CouncilError> {
        info!(
            "Debate: {} agents, {} rounds, {} voting",
            self.agents.len(),
            self.rounds,
            self.voting
        );

        if self.voting.requires_moderator() && self.moderator.is_none() {
            return Err(CouncilError::Configuration(
                "moderator voting requires a moderator".to_string(),
            ));
        }

        let guidance = self.guidance(task, cancel).await?;

        let mut proposals = ProposalSet::new();
        let prompt = self.proposal_prompt(task, guidance.as_deref(), context);
        let replies = self.ask_all(&prompt, cancel).await?;
        for (agent, text) in self.agents.iter().zip(replies) {
            proposals.insert_original(agent.name(), text)?;
        }

        let mut consensus = self.find_consensus(&proposals, 1);
        let mut rounds_completed = 0;

        for round in 0..self.rounds {
            if consensus.is_some() {
                info!("Consensus reached, skipping remaining rounds");
                break;
            }

            debug!("Debate round {}", round + 1);
            let prompt = round_prompt(round, task, &proposals);
            let replies = self.ask_all(&prompt, cancel).await?;
            for (agent, text) in self.agents.iter().zip(replies) {
                proposals.insert_revision(agent.name(), round, text)?;
            }
            rounds_completed += 1;

            consensus = self.find_consensus(&proposals, round + 2);
        }

        let mut decision = match (self.voting, consensus) {
            (VotingMethod::Consensus, Some(found)) => {
                let mut metadata = Map::new();
                metadata.insert("consensusReached".to_string(), Value::Bool(true));
                metadata.insert("roundsToConsensus".to_string(), Value::from(found.round));
                Decision {
                    key: found.agent,
                    text: found.text,
                    metadata,
                }
            }
            (VotingMethod::Consensus, None) => {
                let mut decision = self.vote(&proposals, BallotWeight::Equal, cancel).await?;
                decision
                    .metadata
                    .insert("consensusReached".to_string(), Value::Bool(false));
                decision
            }
            (VotingMethod::Majority, _) => {
                self.vote(&proposals, BallotWeight::Equal, cancel).await?
            }
            (VotingMethod::Weighted, _) => {
                self.vote(&proposals, BallotWeight::Expertise, cancel).await?
            }
            (VotingMethod::Moderator, _) => {
                let moderator = self.moderator.as_ref().ok_or_else(|| {
                    CouncilError::Configuration(
                        "moderator voting requires a moderator".to_string(),
                    )
                })?;
                voting::moderate(moderator, task, &proposals, cancel).await?
            }
        };

        let mut metadata = Map::new();
        metadata.insert("winner".to_string(), Value::from(decision.text.as_str()));
        metadata.insert("winnerKey".to_string(), Value::from(decision.key.as_str()));
        metadata.insert("proposals".to_string(), Value::from(proposals.keys()));
        metadata.insert("strategy".to_string(), Value::from(self.voting.as_str()));
        metadata.insert("rounds".to_string(), Value::from(self.rounds));
        metadata.insert("roundsCompleted".to_string(), Value::from(rounds_completed));
        metadata.insert("agents".to_string(), Value::from(agent_names(&self.agents)));
        metadata.append(&mut decision.metadata);

        Ok(StageResult::success(decision.text).with_metadata(metadata))
    }

    async fn guidance(
        &self,
        task: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, CouncilError> {
        let moderator = match (&self.moderator, self.moderator_guidance) {
            (Some(moderator), true) => moderator,
            _ => return Ok(None),
        };

        debug!("Requesting guidance from moderator {}", moderator.name());
        let prompt = format!(
            "{}\n\nProvide guidance for agents working on this task.",
            task
        );
        let reply = all_or_first_error(
            fan_out(vec![AgentCall::new(moderator, prompt)], cancel).await?,
        )?;
        Ok(reply.into_iter().next())
    }

    fn proposal_prompt(&self, task: &str, guidance: Option<&str>, context: &Context) -> String {
        let mut base = format!("Current date and time: {}\n\nTask: {}", current_time(), task);
        if let Some(guidance) = guidance {
            base.push_str(&format!("\n\nModerator guidance: {}", guidance));
        }
        base.push_str("\n\n");
        base.push_str(&context.prompt_projection());

        let instructions = if self.structured_proposals {
            "\nProvide your proposal in the following format:\n\
             Solution: [Your solution]\n\
             Reasoning: [Why this solution works]\n\
             Challenges: [Potential challenges]"
        } else {
            "\nProvide your proposal for solving this task."
        };

        [base.as_str(), instructions, "Include your reasoning."].join("\n")
    }

    async fn ask_all(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, CouncilError> {
        let calls = self
            .agents
            .iter()
            .map(|agent| AgentCall::new(agent, prompt))
            .collect();
        all_or_first_error(fan_out(calls, cancel).await?)
    }

    async fn vote(
        &self,
        proposals: &ProposalSet,
        weight: BallotWeight,
        cancel: &CancellationToken,
    ) -> Result<Decision, CouncilError> {
        voting::vote(&self.agents, proposals, weight, self.allow_self_votes, cancel).await
    }

    /// Only consulted under consensus voting.
    fn find_consensus(&self, proposals: &ProposalSet, round: usize) -> Option<Consensus> {
        if self.voting != VotingMethod::Consensus {
            return None;
        }

        let latest: Vec<&str> = self
            .agents
            .iter()
            .filter_map(|agent| proposals.latest_for(agent.name()))
            .collect();
        if latest.len() != self.agents.len() {
            return None;
        }

        let text = check_consensus(latest)?;
        Some(Consensus {
            agent: self.agents.first()?.name().to_string(),
            text: text.to_string(),
            round,
        })
    }
}

fn round_prompt(round: usize, task: &str, proposals: &ProposalSet) -> String {
    let mut lines = vec![
        format!("Debate Round {}", round + 1),
        format!("Original Task: {}", task),
        "\nCurrent Proposals:".to_string(),
    ];
    for proposal in proposals.originals() {
        lines.push(format!(
            "\n{}: {}",
            proposal.key,
            truncate(&proposal.text, ROUND_PREVIEW_CHARS)
        ));
    }
    lines.push("\nProvide your updated proposal or critique others' proposals.".to_string());
    lines.join("\n")
}

impl std::fmt::Debug for DebateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebateStage")
            .field("agents", &agent_names(&self.agents))
            .field("moderator", &self.moderator.as_ref().map(|m| m.name().to_string()))
            .field("rounds", &self.rounds)
            .field("voting", &self.voting)
            .field("moderator_guidance", &self.moderator_guidance)
            .field("allow_self_votes", &self.allow_self_votes)
            .field("structured_proposals", &self.structured_proposals)
            .finish()
    }
}
