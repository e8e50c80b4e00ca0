//! Shared council context
//!
//! [`Context`] accumulates keyed data and stage results across a council run
//! and renders a bounded projection of them for agent prompts.

pub mod entities;
pub mod history;

pub use entities::{
    Context, ContextMetadata, ContextSummary, DEFAULT_PROJECTION_LIMIT, PROJECTED_RESULTS,
    TRUNCATION_MARKER,
};
pub use history::{HistoryAction, HistoryEntry};
