//! Council orchestration domain
//!
//! Value types shared by the step orchestrator: the error strategy, lifecycle
//! events, task splitting and the final run report.

pub mod events;
pub mod policy;
pub mod report;
pub mod split;

pub use events::CouncilEvent;
pub use policy::ErrorStrategy;
pub use report::{CouncilReport, SEQUENTIAL_WORKFLOW};
pub use split::{SplitMethod, split_by_lines};
