//! Use cases
//!
//! Application-level operations that orchestrate domain logic.
//!
//! ```text
//! Council ──▶ ModeratorAssigner ──▶ StepOrchestrator
//!                                        │
//!                                        ▼ per stage
//!                                   ErrorHandler
//!                                        │
//!                          ┌─────────────┴─────────────┐
//!                          ▼                           ▼
//!                    ParallelStage                DebateStage ──▶ voting
//!                          └────────── fan_out ────────┘
//! ```

pub mod debate;
pub mod error_handler;
pub mod moderator;
pub mod orchestrator;
pub mod parallel;
pub mod run_council;
pub(crate) mod shared;
pub mod stage;
#[cfg(test)]
pub(crate) mod testing;
pub mod voting;
