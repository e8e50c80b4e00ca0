//! Infrastructure layer for council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: command-backed agents, the JSONL event log,
//! and configuration file loading that assembles a runnable council.

pub mod agents;
pub mod config;
pub mod factory;
pub mod logging;

// Re-export commonly used types
pub use agents::CommandAgent;
pub use config::{
    ConfigLoader, FileAgentConfig, FileConfig, FileCouncilConfig, FileLoggingConfig,
    FileOutputConfig, FileParallelStrategy, FileStageConfig,
};
pub use factory::{BuildError, CouncilFactory};
pub use logging::JsonlEventLog;
