//! Ballots and tallies for debate voting.

use super::parsing::VoteChoice;
use super::proposal::ProposalSet;
use serde_json::{Map, Value};

/// Weight given to a voter without an expertise level.
pub const DEFAULT_VOTE_WEIGHT: f64 = 0.5;

/// One voter's parsed reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Ballot {
    pub voter: String,
    pub choice: VoteChoice,
    /// Only used by weighted tallies
    pub weight: f64,
}

impl Ballot {
    pub fn new(voter: impl Into<String>, choice: VoteChoice) -> Self {
        Self {
            voter: voter.into(),
            choice,
            weight: DEFAULT_VOTE_WEIGHT,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Per-proposal totals.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalCount {
    pub key: String,
    pub text: String,
    pub votes: usize,
    pub score: f64,
}

/// Winner picked by a tally.
#[derive(Debug, Clone, PartialEq)]
pub struct TallyWinner {
    pub key: String,
    pub text: String,
    /// More than one proposal shared the top value
    pub tie: bool,
}

/// Aggregated ballots over the original proposals of a debate.
///
/// Counts are kept in declaration order so ties resolve to the first
/// declared proposal.
///
/// # Example
///
/// ```
/// use council_domain::quorum::{Ballot, ProposalSet, VoteChoice, VoteTally};
///
/// let mut proposals = ProposalSet::new();
/// proposals.insert_original("a", "X").unwrap();
/// proposals.insert_original("b", "Y").unwrap();
///
/// let tally = VoteTally::count(&proposals, &[
///     Ballot::new("a", VoteChoice::Proposal("a".into())),
///     Ballot::new("b", VoteChoice::Proposal("a".into())),
/// ]);
/// let winner = tally.majority_winner().unwrap();
/// assert_eq!(winner.text, "X");
/// assert!(!winner.tie);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VoteTally {
    counts: Vec<ProposalCount>,
    voter_choices: Vec<(String, String)>,
    abstentions: usize,
    unparsed: usize,
}

impl VoteTally {
    /// Tally ballots. Unparsed ballots count as abstentions.
    pub fn count(proposals: &ProposalSet, ballots: &[Ballot]) -> Self {
        let mut counts: Vec<ProposalCount> = proposals
            .originals()
            .map(|p| ProposalCount {
                key: p.key.clone(),
                text: p.text.clone(),
                votes: 0,
                score: 0.0,
            })
            .collect();

        let mut voter_choices = Vec::new();
        let mut abstentions = 0;
        let mut unparsed = 0;

        for ballot in ballots {
            match &ballot.choice {
                VoteChoice::Proposal(key) => {
                    match counts.iter_mut().find(|c| &c.key == key) {
                        Some(entry) => {
                            entry.votes += 1;
                            entry.score += ballot.weight;
                            voter_choices.push((ballot.voter.clone(), entry.text.clone()));
                        }
                        None => {
                            abstentions += 1;
                            unparsed += 1;
                        }
                    }
                }
                VoteChoice::Abstain => abstentions += 1,
                VoteChoice::NoMatch => {
                    abstentions += 1;
                    unparsed += 1;
                }
            }
        }

        Self {
            counts,
            voter_choices,
            abstentions,
            unparsed,
        }
    }

    pub fn counts(&self) -> &[ProposalCount] {
        &self.counts
    }

    /// Number of ballots matched to a proposal.
    pub fn total_votes(&self) -> usize {
        self.counts.iter().map(|c| c.votes).sum()
    }

    pub fn total_score(&self) -> f64 {
        self.counts.iter().map(|c| c.score).sum()
    }

    pub fn abstentions(&self) -> usize {
        self.abstentions
    }

    pub fn unparsed(&self) -> usize {
        self.unparsed
    }

    /// `(voter, chosen proposal text)` for every matched ballot.
    pub fn voter_choices(&self) -> &[(String, String)] {
        &self.voter_choices
    }

    /// Highest vote count wins. `None` only when there are no proposals.
    pub fn majority_winner(&self) -> Option<TallyWinner> {
        self.pick(|c| c.votes as f64)
    }

    /// Highest weighted score wins. `None` only when there are no proposals.
    pub fn weighted_winner(&self) -> Option<TallyWinner> {
        self.pick(|c| c.score)
    }

    fn pick(&self, value: impl Fn(&ProposalCount) -> f64) -> Option<TallyWinner> {
        let first = self.counts.first()?;

        if self.total_votes() == 0 {
            return Some(TallyWinner {
                key: first.key.clone(),
                text: first.text.clone(),
                tie: false,
            });
        }

        let top = self
            .counts
            .iter()
            .map(&value)
            .fold(f64::NEG_INFINITY, f64::max);
        let mut leaders = self.counts.iter().filter(|c| value(c) == top);
        let winner = leaders.next()?;

        Some(TallyWinner {
            key: winner.key.clone(),
            text: winner.text.clone(),
            tie: leaders.next().is_some(),
        })
    }

    // ==================== Metadata ====================

    /// Metadata entries for a majority (count based) decision.
    ///
    /// `votes` is keyed by proposal key since agents may propose identical text.
    pub fn majority_metadata(&self, winner: &TallyWinner) -> Map<String, Value> {
        let mut meta = Map::new();
        let votes: Map<String, Value> = self
            .counts
            .iter()
            .map(|c| (c.key.clone(), Value::from(c.votes)))
            .collect();
        meta.insert("votes".to_string(), Value::Object(votes));
        self.common_metadata(&mut meta, winner);
        meta
    }

    /// Metadata entries for a weighted decision.
    pub fn weighted_metadata(&self, winner: &TallyWinner) -> Map<String, Value> {
        let mut meta = self.majority_metadata(winner);
        let scores: Map<String, Value> = self
            .counts
            .iter()
            .map(|c| (c.key.clone(), Value::from(c.score)))
            .collect();
        meta.insert("weightedScores".to_string(), Value::Object(scores));
        meta
    }

    fn common_metadata(&self, meta: &mut Map<String, Value>, winner: &TallyWinner) {
        let choices: Map<String, Value> = self
            .voter_choices
            .iter()
            .map(|(voter, text)| (voter.clone(), Value::from(text.as_str())))
            .collect();
        meta.insert("voterChoices".to_string(), Value::Object(choices));
        meta.insert("abstentions".to_string(), Value::from(self.abstentions));
        meta.insert("unparsedVotes".to_string(), Value::from(self.unparsed));
        meta.insert("totalVotes".to_string(), Value::from(self.total_votes()));
        if winner.tie {
            meta.insert("tie".to_string(), Value::Bool(true));
            meta.insert(
                "tieResolution".to_string(),
                Value::from("first_proposal"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proposals(names: &[(&str, &str)]) -> ProposalSet {
        let mut set = ProposalSet::new();
        for (name, text) in names {
            set.insert_original(*name, *text).unwrap();
        }
        set
    }

    fn vote(voter: &str, key: &str) -> Ballot {
        Ballot::new(voter, VoteChoice::Proposal(key.to_string()))
    }

    // ==================== Majority Tests ====================

    #[test]
    fn test_majority_unanimous() {
        let set = proposals(&[("a", "X"), ("b", "Y")]);
        let tally = VoteTally::count(&set, &[vote("a", "a"), vote("b", "a")]);
        let winner = tally.majority_winner().unwrap();

        assert_eq!(winner.key, "a");
        let meta = tally.majority_metadata(&winner);
        assert_eq!(meta["votes"], json!({"a": 2, "b": 0}));
        assert_eq!(meta["abstentions"], json!(0));
        assert_eq!(meta["totalVotes"], json!(2));
        assert!(meta.get("tie").is_none());
    }

    #[test]
    fn test_majority_tie_resolves_to_first_declared() {
        let set = proposals(&[("a", "X"), ("b", "Y"), ("c", "Z")]);
        let tally = VoteTally::count(
            &set,
            &[vote("a", "b"), vote("b", "c"), Ballot::new("c", VoteChoice::Abstain)],
        );
        let winner = tally.majority_winner().unwrap();

        assert_eq!(winner.key, "b");
        assert!(winner.tie);
        let meta = tally.majority_metadata(&winner);
        assert_eq!(meta["tie"], json!(true));
        assert_eq!(meta["tieResolution"], json!("first_proposal"));
    }

    #[test]
    fn test_winner_count_is_maximum() {
        let set = proposals(&[("a", "X"), ("b", "Y"), ("c", "Z")]);
        let tally = VoteTally::count(
            &set,
            &[vote("a", "c"), vote("b", "c"), vote("c", "a")],
        );
        let winner = tally.majority_winner().unwrap();
        let winning = tally.counts().iter().find(|c| c.key == winner.key).unwrap();
        assert!(tally.counts().iter().all(|c| c.votes <= winning.votes));
        assert_eq!(winner.text, "Z");
    }

    #[test]
    fn test_zero_votes_picks_first_without_tie() {
        let set = proposals(&[("a", "X"), ("b", "Y")]);
        let tally = VoteTally::count(
            &set,
            &[
                Ballot::new("a", VoteChoice::Abstain),
                Ballot::new("b", VoteChoice::NoMatch),
            ],
        );
        let winner = tally.majority_winner().unwrap();
        assert_eq!(winner.key, "a");
        assert!(!winner.tie);

        let meta = tally.majority_metadata(&winner);
        assert_eq!(meta["totalVotes"], json!(0));
        assert_eq!(meta["abstentions"], json!(2));
        assert_eq!(meta["unparsedVotes"], json!(1));
    }

    #[test]
    fn test_identical_proposal_texts_keep_separate_counts() {
        let set = proposals(&[("a", "Same"), ("b", "Same"), ("c", "Z")]);
        let tally = VoteTally::count(
            &set,
            &[vote("a", "a"), vote("b", "a"), vote("c", "c")],
        );
        let winner = tally.weighted_winner().unwrap();
        assert_eq!(winner.key, "a");

        let meta = tally.weighted_metadata(&winner);
        assert_eq!(meta["votes"], json!({"a": 2, "b": 0, "c": 1}));
        assert_eq!(meta["weightedScores"], json!({"a": 1.0, "b": 0.0, "c": 0.5}));
        assert_eq!(meta["totalVotes"], json!(3));
    }

    #[test]
    fn test_voter_choices_record_text() {
        let set = proposals(&[("a", "X"), ("b", "Y")]);
        let tally = VoteTally::count(&set, &[vote("a", "b")]);
        assert_eq!(
            tally.voter_choices(),
            &[("a".to_string(), "Y".to_string())]
        );
    }

    #[test]
    fn test_no_proposals() {
        let tally = VoteTally::count(&ProposalSet::new(), &[]);
        assert!(tally.majority_winner().is_none());
    }

    // ==================== Weighted Tests ====================

    #[test]
    fn test_weighted_expert_outvotes_majority() {
        let set = proposals(&[("a", "X"), ("b", "Y"), ("c", "Z")]);
        let tally = VoteTally::count(
            &set,
            &[
                vote("a", "a").with_weight(0.9),
                vote("b", "b").with_weight(0.3),
                vote("c", "b").with_weight(0.3),
            ],
        );

        assert_eq!(tally.majority_winner().unwrap().key, "b");
        let winner = tally.weighted_winner().unwrap();
        assert_eq!(winner.key, "a");
        assert!(!winner.tie);

        let meta = tally.weighted_metadata(&winner);
        assert_eq!(meta["weightedScores"]["a"], json!(0.9));
        assert!((tally.total_score() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_tie_resolves_to_first_declared() {
        let set = proposals(&[("a", "X"), ("b", "Y")]);
        let tally = VoteTally::count(&set, &[vote("a", "b"), vote("b", "a")]);
        let winner = tally.weighted_winner().unwrap();
        assert_eq!(winner.key, "a");
        assert!(winner.tie);
    }

    #[test]
    fn test_default_weight() {
        assert_eq!(Ballot::new("v", VoteChoice::Abstain).weight, DEFAULT_VOTE_WEIGHT);
    }
}
