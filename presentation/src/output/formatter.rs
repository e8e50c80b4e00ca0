//! Output formatter trait

use council_domain::{CouncilReport, OutputFormat};

/// Trait for formatting council reports
pub trait OutputFormatter {
    /// Format every stage with its details
    fn format_full(&self, report: &CouncilReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &CouncilReport) -> String;

    /// Format the last stage's output only (concise output)
    fn format_final(&self, report: &CouncilReport) -> String;

    fn render(&self, report: &CouncilReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format_full(report),
            OutputFormat::Final => self.format_final(report),
            OutputFormat::Json => self.format_json(report),
        }
    }
}
