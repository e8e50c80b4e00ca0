//! Moderator assignment for debate stages.

use crate::ports::agent::SharedAgent;
use crate::use_cases::debate::DebateStage;
use crate::use_cases::stage::Stage;
use tracing::debug;

/// Fills in missing debate moderators before a council runs.
///
/// Pool agents are handed out round-robin; the position persists across
/// [`ModeratorAssigner::assign`] calls. Without a pool every debate gets the
/// default moderator. Stages that already have a moderator are left alone.
#[derive(Clone, Default)]
pub struct ModeratorAssigner {
    default: Option<SharedAgent>,
    pool: Vec<SharedAgent>,
    next: usize,
}

impl ModeratorAssigner {
    pub fn new(default: Option<SharedAgent>) -> Self {
        Self {
            default,
            pool: Vec::new(),
            next: 0,
        }
    }

    pub fn with_pool(mut self, pool: Vec<SharedAgent>) -> Self {
        self.pool = pool;
        self.next = 0;
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Assign moderators to every debate stage that lacks one.
    ///
    /// Returns the number of stages that received a moderator.
    pub fn assign(&mut self, stages: &mut [Stage]) -> usize {
        let mut assigned = 0;
        for (index, stage) in stages.iter_mut().enumerate() {
            let Some(debate) = stage.as_debate_mut() else {
                continue;
            };
            if debate.has_moderator() {
                continue;
            }
            let Some(moderator) = self.next_moderator() else {
                continue;
            };
            debug!("Stage {}: moderator {}", index, moderator.name());
            if debate.assign_moderator(moderator) {
                assigned += 1;
            }
        }
        assigned
    }

    /// Assign a specific moderator to one debate; an existing one is kept.
    pub fn assign_specific(&self, stage: &mut DebateStage, moderator: SharedAgent) -> bool {
        stage.assign_moderator(moderator)
    }

    fn next_moderator(&mut self) -> Option<SharedAgent> {
        if self.pool.is_empty() {
            return self.default.clone();
        }
        let moderator = SharedAgent::clone(&self.pool[self.next % self.pool.len()]);
        self.next = (self.next + 1) % self.pool.len();
        Some(moderator)
    }
}

impl std::fmt::Debug for ModeratorAssigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeratorAssigner")
            .field("default", &self.default.as_ref().map(|m| m.name().to_string()))
            .field(
                "pool",
                &self.pool.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("next", &self.next)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::parallel::ParallelStage;
    use crate::use_cases::testing::{ScriptedAgent, shared};

    fn debate() -> Stage {
        let a = ScriptedAgent::new("a").shared();
        DebateStage::new(shared(&[&a])).into()
    }

    fn moderator_of(stage: &mut Stage) -> Option<String> {
        stage
            .as_debate_mut()
            .and_then(|d| d.moderator().map(|m| m.name().to_string()))
    }

    #[test]
    fn test_pool_round_robin_persists_across_calls() {
        let m1 = ScriptedAgent::new("m1").shared();
        let m2 = ScriptedAgent::new("m2").shared();
        let mut assigner = ModeratorAssigner::new(None).with_pool(shared(&[&m1, &m2]));

        let mut first = vec![debate(), debate(), debate()];
        assert_eq!(assigner.assign(&mut first), 3);
        let names: Vec<_> = first.iter_mut().map(|s| moderator_of(s).unwrap()).collect();
        assert_eq!(names, vec!["m1", "m2", "m1"]);

        let mut second = vec![debate()];
        assigner.assign(&mut second);
        assert_eq!(moderator_of(&mut second[0]).unwrap(), "m2");
    }

    #[test]
    fn test_default_used_without_pool() {
        let fallback = ScriptedAgent::new("chair").shared();
        let mut assigner = ModeratorAssigner::new(Some(fallback));
        let mut stages = vec![debate(), debate()];

        assigner.assign(&mut stages);
        assert_eq!(moderator_of(&mut stages[0]).unwrap(), "chair");
        assert_eq!(moderator_of(&mut stages[1]).unwrap(), "chair");
    }

    #[test]
    fn test_existing_moderator_and_parallel_stages_untouched() {
        let a = ScriptedAgent::new("a").shared();
        let own = ScriptedAgent::new("own").shared();
        let pooled = ScriptedAgent::new("pooled").shared();
        let mut assigner = ModeratorAssigner::new(None).with_pool(shared(&[&pooled]));

        let mut stages = vec![
            Stage::from(ParallelStage::new(shared(&[&a]))),
            Stage::from(DebateStage::new(shared(&[&a])).with_moderator(own)),
            debate(),
        ];

        assert_eq!(assigner.assign(&mut stages), 1);
        assert_eq!(moderator_of(&mut stages[1]).unwrap(), "own");
        assert_eq!(moderator_of(&mut stages[2]).unwrap(), "pooled");
    }

    #[test]
    fn test_no_default_no_pool_assigns_nothing() {
        let mut assigner = ModeratorAssigner::default();
        let mut stages = vec![debate()];
        assert_eq!(assigner.assign(&mut stages), 0);
        assert!(moderator_of(&mut stages[0]).is_none());
    }

    #[test]
    fn test_assign_specific() {
        let a = ScriptedAgent::new("a").shared();
        let chosen = ScriptedAgent::new("chosen").shared();
        let assigner = ModeratorAssigner::default();
        let mut stage = DebateStage::new(shared(&[&a]));

        assert!(assigner.assign_specific(&mut stage, chosen));
        assert_eq!(stage.moderator().unwrap().name(), "chosen");
    }
}
