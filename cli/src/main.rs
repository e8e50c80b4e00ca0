//! CLI entrypoint for council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use council_application::{CompositeEventSink, EventSink};
use council_infrastructure::{ConfigLoader, CouncilFactory, FileConfig, JsonlEventLog};
use council_presentation::{
    Cli, ConsoleFormatter, OutputConfig, OutputFormatter, ProgressReporter, SimpleProgress,
};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered log lines reach the file
    let _log_guard = init_logging(&cli)?;

    info!("Starting council");

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let config = load_config(&cli)?;
    let output = OutputConfig::resolve(&cli, config.output.format, config.output.color);
    if !output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let events = event_sinks(&cli, &config, &output);
    let mut council = CouncilFactory::new(&config).build(Arc::new(events))?;

    if cli.check {
        println!(
            "Configuration OK: {} stages, {} agents",
            council.stages().len(),
            council.agent_names().len()
        );
        return Ok(());
    }

    let task = match cli.task {
        Some(task) => task,
        None => bail!("A task is required. Run `council --help` for usage."),
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling council run");
            on_interrupt.cancel();
        }
    });

    let report = council.execute_with_cancel(&task, &cancel).await?;

    println!("{}", ConsoleFormatter.render(&report, output.format));

    Ok(())
}

/// Initialize logging based on verbosity level.
///
/// With `--log-file` the output goes to that file through a non-blocking
/// writer whose guard must outlive the run.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")
}

/// Progress display plus the optional JSONL event log.
fn event_sinks(cli: &Cli, config: &FileConfig, output: &OutputConfig) -> CompositeEventSink {
    let mut sinks = CompositeEventSink::default();

    if output.show_progress {
        let progress: Arc<dyn EventSink> = if std::io::stderr().is_terminal() {
            Arc::new(ProgressReporter::new())
        } else {
            Arc::new(SimpleProgress)
        };
        sinks = sinks.with(progress);
    }

    let events_path = cli
        .events_file
        .clone()
        .or_else(|| config.logging.events_path());
    if let Some(path) = events_path {
        match JsonlEventLog::new(&path) {
            Some(log) => sinks = sinks.with(Arc::new(log)),
            None => warn!("Event log disabled: cannot open {}", path.display()),
        }
    }

    sinks
}
