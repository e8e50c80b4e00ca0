//! Progress reporting for council execution
//!
//! Both reporters are [`EventSink`]s: the orchestrator drives them through
//! the same event stream that feeds the JSONL log.

use colored::Colorize;
use council_application::EventSink;
use council_domain::CouncilEvent;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during council execution with a progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn step_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ProgressReporter {
    fn emit(&self, event: &CouncilEvent) {
        match event {
            CouncilEvent::CouncilStart { council, .. } => {
                let bar = ProgressBar::new(0);
                bar.set_style(Self::step_style());
                bar.set_prefix(council.clone());
                bar.set_message("Starting...");
                if let Ok(mut guard) = self.bar.lock() {
                    *guard = Some(bar);
                }
            }
            CouncilEvent::StepStart { index, kind, total } => self.with_bar(|bar| {
                bar.set_length(*total as u64);
                bar.set_message(format!("Step {}: {}", index + 1, kind.display_name()));
            }),
            CouncilEvent::StepComplete { index, result, .. } => self.with_bar(|bar| {
                let status = if result.success {
                    format!("{} step {}", "v".green(), index + 1)
                } else {
                    format!("{} step {}", "x".red(), index + 1)
                };
                bar.set_message(status);
                bar.inc(1);
            }),
            CouncilEvent::StepError { step, error, .. } => self.with_bar(|bar| {
                bar.println(format!("{} step {}: {}", "!".yellow(), step + 1, error));
            }),
            CouncilEvent::StepRetry {
                step,
                attempt,
                delay_ms,
            } => self.with_bar(|bar| {
                bar.set_message(format!(
                    "Retrying step {} (retry {}) in {}ms",
                    step + 1,
                    attempt,
                    delay_ms
                ));
            }),
            CouncilEvent::StepRetrySuccess { .. } | CouncilEvent::StepFallback { .. } => {}
            CouncilEvent::CouncilComplete { .. } => {
                if let Ok(mut guard) = self.bar.lock() {
                    if let Some(bar) = guard.take() {
                        bar.finish_with_message(format!("{}", "Council complete!".green()));
                    }
                }
            }
        }
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl SimpleProgress {
    /// The line printed for `event`, if any.
    pub fn line(event: &CouncilEvent) -> Option<String> {
        match event {
            CouncilEvent::CouncilStart { council, .. } => {
                Some(format!("{} {}", "->".cyan(), council.bold()))
            }
            CouncilEvent::StepStart { index, kind, total } => Some(format!(
                "  {} step {}/{}: {}",
                "->".cyan(),
                index + 1,
                total,
                kind.display_name()
            )),
            CouncilEvent::StepComplete { index, result, .. } => Some(if result.success {
                format!("  {} step {}", "v".green(), index + 1)
            } else {
                format!("  {} step {} (failed)", "x".red(), index + 1)
            }),
            CouncilEvent::StepError { step, error, .. } => {
                Some(format!("  {} step {}: {}", "!".yellow(), step + 1, error))
            }
            CouncilEvent::StepRetry {
                step,
                attempt,
                delay_ms,
            } => Some(format!(
                "  {} retrying step {} (retry {}) in {}ms",
                "~".yellow(),
                step + 1,
                attempt,
                delay_ms
            )),
            CouncilEvent::StepRetrySuccess { .. } | CouncilEvent::StepFallback { .. } => None,
            CouncilEvent::CouncilComplete {
                steps_completed, ..
            } => Some(format!(
                "{} {} steps completed\n",
                "->".cyan(),
                steps_completed
            )),
        }
    }
}

impl EventSink for SimpleProgress {
    fn emit(&self, event: &CouncilEvent) {
        if let Some(line) = Self::line(event) {
            eprintln!("{}", line);
        }
    }
}
