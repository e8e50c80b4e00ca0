//! Scripted agents for use case tests.

use crate::ports::agent::{Agent, AgentError, EXPERTISE_LEVEL, SharedAgent};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A scripted reply for the mock agent
#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    Error(String),
}

/// Mock agent that returns scripted replies in order and records prompts.
///
/// Once the script is exhausted it keeps returning `fallback`.
pub struct ScriptedAgent {
    name: String,
    responses: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    prompts: Mutex<Vec<String>>,
    capabilities: Map<String, Value>,
}

impl ScriptedAgent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            responses: Mutex::new(VecDeque::new()),
            fallback: Scripted::Text(format!("{} reply", name)),
            prompts: Mutex::new(Vec::new()),
            capabilities: Map::new(),
        }
    }

    /// Always reply with `text`.
    pub fn replying(name: &str, text: &str) -> Self {
        Self::new(name).with_fallback(Scripted::Text(text.to_string()))
    }

    /// Always fail with `message`.
    pub fn failing(name: &str, message: &str) -> Self {
        Self::new(name).with_fallback(Scripted::Error(message.to_string()))
    }

    pub fn with_script(self, replies: Vec<&str>) -> Self {
        *self.responses.lock().unwrap() = replies
            .into_iter()
            .map(|r| Scripted::Text(r.to_string()))
            .collect();
        self
    }

    pub fn with_steps(self, steps: Vec<Scripted>) -> Self {
        *self.responses.lock().unwrap() = steps.into();
        self
    }

    pub fn with_fallback(mut self, fallback: Scripted) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_expertise(mut self, level: f64) -> Self {
        self.capabilities
            .insert(EXPERTISE_LEVEL.to_string(), json!(level));
        self
    }

    pub fn with_capability(mut self, key: &str, value: Value) -> Self {
        self.capabilities.insert(key.to_string(), value);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn work_on(&self, task: &str) -> Result<String, AgentError> {
        self.prompts.lock().unwrap().push(task.to_string());
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            Scripted::Text(t) => Ok(t),
            Scripted::Error(e) => Err(AgentError::Failed(e)),
        }
    }

    fn capabilities(&self) -> Map<String, Value> {
        self.capabilities.clone()
    }
}

/// Upcast scripted agents for stage constructors while keeping handles.
pub fn shared(agents: &[&Arc<ScriptedAgent>]) -> Vec<SharedAgent> {
    agents
        .iter()
        .map(|a| Arc::clone(*a) as SharedAgent)
        .collect()
}
