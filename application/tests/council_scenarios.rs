//! End-to-end council runs against in-memory agents.

use async_trait::async_trait;
use council_application::ports::fallback::FailedStage;
use council_application::{
    Agent, AgentError, ChannelEventSink, Council, DebateStage, ErrorPolicy, ModeratorAssigner,
    ParallelStage, SharedAgent, Stage,
};
use council_domain::{CouncilEvent, StageResult, VotingMethod};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replies from a script, then repeats the last reply.
struct MockAgent {
    name: String,
    script: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Result<String, String>>,
    prompts: Mutex<Vec<String>>,
}

impl MockAgent {
    fn new(name: &str, script: Vec<Result<&str, &str>>) -> Arc<Self> {
        let script: VecDeque<_> = script
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Arc::new(Self {
            name: name.to_string(),
            script: Mutex::new(script),
            last: Mutex::new(Ok(format!("{} reply", name))),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn work_on(&self, task: &str) -> Result<String, AgentError> {
        self.prompts.lock().unwrap().push(task.to_string());
        let next = self.script.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = reply.clone();
                reply
            }
            None => self.last.lock().unwrap().clone(),
        };
        reply.map_err(AgentError::Failed)
    }
}

fn agents(list: &[&Arc<MockAgent>]) -> Vec<SharedAgent> {
    list.iter().map(|a| Arc::clone(*a) as SharedAgent).collect()
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<CouncilEvent>) -> Vec<CouncilEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn majority_debate_without_rounds() {
    let a = MockAgent::new("a", vec![Ok("X"), Ok("I vote for: a")]);
    let b = MockAgent::new("b", vec![Ok("Y"), Ok("I vote for: a")]);
    let mut council = Council::builder("vote")
        .stage(
            DebateStage::new(agents(&[&a, &b]))
                .with_rounds(0)
                .with_voting(VotingMethod::Majority),
        )
        .build();

    let report = council.execute("choose").await.unwrap();
    let result = &report.results[0];

    assert_eq!(result.output, "X");
    assert_eq!(result.meta("winner"), Some(&json!("X")));
    assert_eq!(result.meta("votes"), Some(&json!({"a": 2, "b": 0})));
    assert_eq!(result.meta("abstentions"), Some(&json!(0)));
}

#[tokio::test]
async fn uniform_parallel_stage() {
    let a = MockAgent::new("a", vec![Ok("one")]);
    let b = MockAgent::new("b", vec![Ok("two")]);
    let c = MockAgent::new("c", vec![Ok("three")]);
    let mut council = Council::builder("fan-out")
        .stage(ParallelStage::new(agents(&[&a, &b, &c])))
        .build();

    let report = council.execute("summarize").await.unwrap();

    assert_eq!(a.prompts(), b.prompts());
    assert_eq!(b.prompts(), c.prompts());
    assert_eq!(
        report.final_output(),
        Some("[a]: one\n\n[b]: two\n\n[c]: three")
    );
}

#[tokio::test(start_paused = true)]
async fn retry_recovers_on_third_attempt() {
    let flaky = MockAgent::new(
        "flaky",
        vec![Err("timeout"), Err("timeout"), Ok("recovered")],
    );
    let (sink, mut rx) = ChannelEventSink::new();
    let mut council = Council::builder("retry")
        .stage(ParallelStage::new(agents(&[&flaky])))
        .policy(ErrorPolicy::retry(2).with_backoff_unit(Duration::from_millis(10)))
        .events(Arc::new(sink))
        .build();

    let report = council.execute("t").await.unwrap();

    assert_eq!(report.final_output(), Some("[flaky]: recovered"));
    assert_eq!(flaky.prompts().len(), 3);
    let events = drain(&mut rx);
    assert!(events.contains(&CouncilEvent::StepRetrySuccess {
        step: 0,
        attempts: 3
    }));
    let retries = events
        .iter()
        .filter(|e| matches!(e, CouncilEvent::StepRetry { .. }))
        .count();
    assert_eq!(retries, 2);
}

#[tokio::test]
async fn moderator_pool_fills_every_debate() {
    let a = MockAgent::new("alice", vec![]);
    let moderator = MockAgent::new("m", vec![]);
    let mut council = Council::builder("moderated")
        .stage(DebateStage::new(agents(&[&a])).with_rounds(0))
        .stage(DebateStage::new(agents(&[&a])).with_rounds(0))
        .moderators(ModeratorAssigner::new(None).with_pool(agents(&[&moderator])))
        .build();

    council.execute("t").await.unwrap();

    for stage in council.stages() {
        match stage {
            Stage::Debate(debate) => {
                assert_eq!(debate.moderator().map(|m| m.name()), Some("m"));
            }
            Stage::Parallel(_) => unreachable!(),
        }
    }
}

#[tokio::test]
async fn continue_policy_yields_one_result_per_stage() {
    let ok = MockAgent::new("ok", vec![]);
    let broken = MockAgent::new("broken", vec![Err("no capacity")]);
    let mut council = Council::builder("resilient")
        .stage(ParallelStage::new(agents(&[&ok])))
        .stage(ParallelStage::new(agents(&[&broken])))
        .stage(ParallelStage::new(agents(&[&ok])))
        .policy(ErrorPolicy::continue_on_error())
        .build();

    let report = council.execute("t").await.unwrap();

    assert_eq!(report.steps_completed, 3);
    assert_eq!(report.failed_steps(), 1);
    assert!(report.results[1].is_skipped());
    assert_eq!(report.results[1].output, "stage failed: no capacity");
}

#[tokio::test]
async fn fallback_handler_substitutes_result() {
    let broken = MockAgent::new("broken", vec![Err("down")]);
    let handler = |failed: &FailedStage<'_>| {
        StageResult::success(format!("cached answer for stage {}", failed.index))
    };
    let mut council = Council::builder("fallback")
        .stage(ParallelStage::new(agents(&[&broken])))
        .policy(ErrorPolicy::fallback(Arc::new(handler)))
        .build();

    let report = council.execute("t").await.unwrap();
    assert_eq!(report.final_output(), Some("cached answer for stage 0"));
}

#[tokio::test]
async fn later_stages_see_earlier_results() {
    let researcher = MockAgent::new("researcher", vec![Ok("the cache is cold")]);
    let a = MockAgent::new("a", vec![Ok("warm it"), Ok("I vote for: a")]);
    let b = MockAgent::new("b", vec![Ok("ignore it"), Ok("I vote for: a")]);
    let mut council = Council::builder("pipeline")
        .stage(ParallelStage::new(agents(&[&researcher])))
        .stage(DebateStage::new(agents(&[&a, &b])).with_rounds(0))
        .build();

    let report = council.execute("fix latency").await.unwrap();

    assert!(a.prompts()[0].contains("the cache is cold"));
    assert_eq!(report.final_output(), Some("warm it"));
    assert_eq!(report.agents_involved, vec!["researcher", "a", "b"]);
}
