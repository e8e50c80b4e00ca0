//! Fallback handler port
//!
//! Used by the `fallback` error strategy to produce a substitute result for a
//! failed stage.

use crate::error::CouncilError;
use async_trait::async_trait;
use council_domain::{Context, StageKind, StageResult};

/// Everything a fallback handler knows about the failure.
#[derive(Debug)]
pub struct FailedStage<'a> {
    /// Zero-based stage index
    pub index: usize,
    pub kind: StageKind,
    pub error: &'a CouncilError,
    pub task: &'a str,
    /// Context as it was before the stage ran
    pub context: &'a Context,
}

/// Produces a substitute result when a stage fails.
///
/// Returning an error makes the failure fatal for the run.
///
/// Plain closures are handlers too:
///
/// ```
/// use council_application::ports::fallback::{FailedStage, FallbackHandler};
/// use council_domain::StageResult;
/// use std::sync::Arc;
///
/// let handler: Arc<dyn FallbackHandler> = Arc::new(|failed: &FailedStage<'_>| {
///     StageResult::success(format!("recovered from: {}", failed.error))
/// });
/// ```
#[async_trait]
pub trait FallbackHandler: Send + Sync {
    async fn handle(&self, failed: FailedStage<'_>) -> Result<StageResult, CouncilError>;
}

#[async_trait]
impl<F> FallbackHandler for F
where
    F: Fn(&FailedStage<'_>) -> StageResult + Send + Sync,
{
    async fn handle(&self, failed: FailedStage<'_>) -> Result<StageResult, CouncilError> {
        Ok(self(&failed))
    }
}
