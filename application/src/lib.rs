//! Application layer for council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod error;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ErrorPolicy;
pub use error::CouncilError;
pub use ports::{
    agent::{Agent, AgentError, SharedAgent},
    event_sink::{ChannelEventSink, CompositeEventSink, EventSink, NoEvents},
    fallback::{FailedStage, FallbackHandler},
};
pub use use_cases::debate::DebateStage;
pub use use_cases::moderator::ModeratorAssigner;
pub use use_cases::orchestrator::StepOrchestrator;
pub use use_cases::parallel::{ParallelStage, ParallelStrategy, TaskSplitter};
pub use use_cases::run_council::{Council, CouncilBuilder};
pub use use_cases::stage::Stage;
