//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every stage with its metadata
    Full,
    /// Only the output of the last stage
    Final,
    /// The whole report as JSON
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => council_domain::OutputFormat::Full,
            OutputFormat::Final => council_domain::OutputFormat::Final,
            OutputFormat::Json => council_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for council
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(author, version, about = "Run a council of agents over a task")]
#[command(long_about = r#"
Council runs a pipeline of agent stages over a task.

Each stage is either:
  parallel  Agents work concurrently and their outputs are merged
  debate    Agents propose, revise over rounds, then vote on a winner

Agents, stages and error handling are defined in TOML. Configuration
files are loaded from (in priority order):
1. COUNCIL_* environment variables
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/council/config.toml   Global config

Example:
  council "Design a caching layer for the billing service"
  council --config review.toml -o full "Review the retry logic in pay.rs"
  council --show-config
"#)]
pub struct Cli {
    /// The task to put before the council
    pub task: Option<String>,

    /// Output format (overrides [output] format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    pub check: bool,

    /// Append council events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub events_file: Option<PathBuf>,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
