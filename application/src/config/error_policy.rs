//! Error policy: how the orchestrator treats a failed stage.
//!
//! [`ErrorPolicy`] pairs the domain [`ErrorStrategy`] with the runtime knobs
//! it needs: retry budget, backoff unit and an optional fallback handler.

use crate::ports::fallback::FallbackHandler;
use council_domain::ErrorStrategy;
use std::sync::Arc;
use std::time::Duration;

/// Failure handling configuration for every stage of a council.
///
/// Retry waits `backoff_unit * 2^attempt` between attempts, so the default
/// policy with retries enabled waits 1s, 2s, 4s.
#[derive(Clone)]
pub struct ErrorPolicy {
    pub strategy: ErrorStrategy,
    /// Retries after the first failure (total attempts = `max_retries + 1`)
    pub max_retries: u32,
    pub backoff_unit: Duration,
    pub fallback: Option<Arc<dyn FallbackHandler>>,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            strategy: ErrorStrategy::Halt,
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
            fallback: None,
        }
    }
}

impl std::fmt::Debug for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPolicy")
            .field("strategy", &self.strategy)
            .field("max_retries", &self.max_retries)
            .field("backoff_unit", &self.backoff_unit)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl ErrorPolicy {
    pub fn new(strategy: ErrorStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn halt() -> Self {
        Self::new(ErrorStrategy::Halt)
    }

    pub fn continue_on_error() -> Self {
        Self::new(ErrorStrategy::Continue)
    }

    pub fn retry(max_retries: u32) -> Self {
        Self::new(ErrorStrategy::Retry).with_max_retries(max_retries)
    }

    pub fn fallback(handler: Arc<dyn FallbackHandler>) -> Self {
        Self::new(ErrorStrategy::Fallback).with_fallback(handler)
    }

    // ==================== Builder Methods ====================

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    pub fn with_fallback(mut self, handler: Arc<dyn FallbackHandler>) -> Self {
        self.fallback = Some(handler);
        self
    }

    /// Delay before retry number `attempt + 1`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}
