//! Console output formatter for council reports

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_domain::{CouncilReport, StageResult};
use serde_json::Value;

/// Formats council reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report
    pub fn format(report: &CouncilReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Council: {}", report.council)));
        output.push('\n');

        output.push_str(&format!("{} {}\n\n", "Task:".cyan().bold(), report.task));
        output.push_str(&format!(
            "{} {}\n",
            "Agents:".cyan().bold(),
            report.agents_involved.join(", ")
        ));

        for (index, result) in report.results.iter().enumerate() {
            output.push_str(&Self::section_header(&format!("Step {}", index + 1)));
            output.push_str(&Self::stage_details(result));
            output.push('\n');
            output.push_str(&result.output);
            output.push('\n');
        }

        output.push_str(&Self::summary(report));
        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &CouncilReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final output only (concise output)
    pub fn format_final(report: &CouncilReport) -> String {
        let mut output = String::new();

        if report.failed_steps() > 0 {
            output.push_str(&format!(
                "{}\n\n",
                format!(
                    "warning: {} of {} steps failed",
                    report.failed_steps(),
                    report.steps_completed
                )
                .yellow()
            ));
        }

        output.push_str(report.final_output().unwrap_or_default());
        output.push('\n');
        output
    }

    fn stage_details(result: &StageResult) -> String {
        let mut lines = Vec::new();

        if !result.success {
            let error = result
                .meta("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            lines.push(format!("{} {}", "Failed:".red().bold(), error));
        }

        if let Some(winner) = result.meta("winnerKey").and_then(Value::as_str) {
            let method = result
                .meta("strategy")
                .and_then(Value::as_str)
                .unwrap_or("vote");
            let rounds = result
                .meta("roundsCompleted")
                .and_then(Value::as_u64)
                .unwrap_or(0);
            lines.push(format!(
                "{} {} (by {}, {} rounds)",
                "Winner:".green().bold(),
                winner,
                method,
                rounds
            ));
        } else if let Some(strategy) = result.meta("strategy").and_then(Value::as_str) {
            lines.push(format!("{} {}", "Strategy:".dimmed(), strategy));
        }

        if let Some(failed) = result.meta("failedAgents").and_then(Value::as_array) {
            let names: Vec<&str> = failed.iter().filter_map(Value::as_str).collect();
            if !names.is_empty() {
                lines.push(format!(
                    "{} {}",
                    "Failed agents:".yellow().bold(),
                    names.join(", ")
                ));
            }
        }

        lines.iter().map(|line| format!("{}\n", line)).collect()
    }

    fn summary(report: &CouncilReport) -> String {
        let failed = report.failed_steps();
        let status = if failed == 0 {
            format!("{} steps completed", report.steps_completed).green()
        } else {
            format!(
                "{} steps completed, {} failed",
                report.steps_completed, failed
            )
            .yellow()
        };
        format!("\n{} {}\n", "Result:".cyan().bold(), status)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, report: &CouncilReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &CouncilReport) -> String {
        Self::format_json(report)
    }

    fn format_final(&self, report: &CouncilReport) -> String {
        Self::format_final(report)
    }
}
