//! Task splitting for task-split parallel stages.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// How a task-split stage derives subtasks when no custom splitter is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Every agent receives the whole task
    #[default]
    Auto,
    /// Lines are distributed in contiguous blocks
    ByLines,
}

impl SplitMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMethod::Auto => "auto",
            SplitMethod::ByLines => "by_lines",
        }
    }

    /// Produce exactly `count` subtasks for `task`.
    pub fn split(&self, task: &str, count: usize) -> Vec<String> {
        match self {
            SplitMethod::Auto => vec![task.to_string(); count],
            SplitMethod::ByLines => split_by_lines(task, count),
        }
    }
}

impl std::fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SplitMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(SplitMethod::Auto),
            "by_lines" | "lines" => Ok(SplitMethod::ByLines),
            _ => Err(DomainError::UnknownSplitMethod(s.to_string())),
        }
    }
}

/// Distribute the lines of `task` over `count` contiguous blocks.
///
/// Each block gets `lines / count` lines and the last one takes the
/// remainder. With fewer lines than `count` every block is the whole task.
///
/// ```
/// use council_domain::orchestration::split_by_lines;
///
/// let parts = split_by_lines("a\nb\nc\nd\ne", 2);
/// assert_eq!(parts, vec!["a\nb", "c\nd\ne"]);
/// ```
pub fn split_by_lines(task: &str, count: usize) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }

    let lines: Vec<&str> = task.trim().split('\n').collect();
    if lines.len() < count {
        return vec![task.to_string(); count];
    }

    let per_block = lines.len() / count;
    (0..count)
        .map(|i| {
            let start = i * per_block;
            let end = if i + 1 < count { start + per_block } else { lines.len() };
            lines[start..end].join("\n")
        })
        .collect()
}
