//! Presentation-level configuration
//!
//! Resolves how a report is shown from the command line and the
//! `[output]` section of the config file.

use crate::cli::commands::Cli;
use council_domain::OutputFormat;

/// Output settings after merging CLI flags over file settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress indicators
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// CLI flags win over file values, file values over defaults.
    pub fn resolve(cli: &Cli, file_format: Option<OutputFormat>, file_color: bool) -> Self {
        Self {
            format: cli
                .output
                .map(Into::into)
                .or(file_format)
                .unwrap_or_default(),
            color: file_color && !cli.no_color,
            show_progress: !cli.quiet,
        }
    }
}
