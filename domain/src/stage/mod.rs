//! Stage value objects shared by every stage type.

pub mod kind;
pub mod result;

pub use kind::StageKind;
pub use result::StageResult;
