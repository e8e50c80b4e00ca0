//! Application-level configuration.
//!
//! - [`ErrorPolicy`]: what happens when a stage fails

pub mod error_policy;

pub use error_policy::ErrorPolicy;
