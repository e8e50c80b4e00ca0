//! Agent backed by an external command.
//!
//! The prompt is written to the command's stdin and its stdout is the reply.
//! This lets any CLI that reads a prompt and prints an answer (`llm`,
//! `ollama run`, a shell script) sit on a council.

use async_trait::async_trait;
use council_application::ports::agent::{Agent, AgentError, EXPERTISE_LEVEL};
use serde_json::{Map, Value};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default timeout for one agent call (5 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Characters of stderr included in failure messages
const STDERR_EXCERPT_CHARS: usize = 500;

/// An [`Agent`] that runs a command per call.
///
/// The child is killed when the call is dropped, so cancelling a council run
/// or hitting the timeout never leaves stray processes behind.
#[derive(Debug, Clone)]
pub struct CommandAgent {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
    capabilities: Map<String, Value>,
}

impl CommandAgent {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            capabilities: Map::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_expertise(mut self, level: f64) -> Self {
        self.capabilities
            .insert(EXPERTISE_LEVEL.to_string(), Value::from(level));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self, task: &str) -> Result<String, AgentError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AgentError::failed(format!(
                    "agent '{}' could not start '{}': {}",
                    self.name, self.program, e
                ))
            })?;

        // Dropping stdin closes it. A child that exits without reading its
        // input is judged by its exit status, not by the broken pipe.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(task.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT_CHARS).collect();
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(AgentError::failed(format!(
                "agent '{}' exited with status {}: {}",
                self.name, code, excerpt
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

#[async_trait]
impl Agent for CommandAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn work_on(&self, task: &str) -> Result<String, AgentError> {
        let start = Instant::now();
        debug!(
            "Agent {} running {} ({} chars of prompt)",
            self.name,
            self.program,
            task.len()
        );

        match tokio::time::timeout(self.timeout, self.run(task)).await {
            Ok(Ok(reply)) => {
                debug!(
                    "Agent {} replied in {:?} ({} chars)",
                    self.name,
                    start.elapsed(),
                    reply.len()
                );
                Ok(reply)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!("Agent {} timed out after {:?}", self.name, self.timeout);
                Err(AgentError::Timeout {
                    agent: self.name.clone(),
                    elapsed: self.timeout,
                })
            }
        }
    }

    fn capabilities(&self) -> Map<String, Value> {
        self.capabilities.clone()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prompt_goes_through_stdin() {
        let agent = CommandAgent::new("echoer", "cat");
        let reply = agent.work_on("hello council\n").await.unwrap();
        assert_eq!(reply, "hello council");
    }

    #[tokio::test]
    async fn test_args_are_passed() {
        let agent = CommandAgent::new("upper", "sh")
            .with_args(vec!["-c".to_string(), "tr a-z A-Z".to_string()]);
        let reply = agent.work_on("quiet").await.unwrap();
        assert_eq!(reply, "QUIET");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let agent = CommandAgent::new("broken", "sh").with_args(vec![
            "-c".to_string(),
            "echo model unavailable >&2; exit 3".to_string(),
        ]);
        let err = agent.work_on("x").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "agent 'broken' exited with status 3: model unavailable"
        );
    }

    #[tokio::test]
    async fn test_missing_program() {
        let agent = CommandAgent::new("ghost", "/nonexistent/council-agent");
        let err = agent.work_on("x").await.unwrap_err();
        assert!(err.to_string().contains("could not start"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let agent = CommandAgent::new("sleepy", "sh")
            .with_args(vec!["-c".to_string(), "sleep 5".to_string()])
            .with_timeout(Duration::from_millis(50));
        let err = agent.work_on("x").await.unwrap_err();
        assert!(matches!(err, AgentError::Timeout { .. }));
    }

    #[test]
    fn test_expertise_capability() {
        let agent = CommandAgent::new("a", "cat").with_expertise(0.8);
        assert_eq!(agent.expertise_level(), 0.8);
    }
}
