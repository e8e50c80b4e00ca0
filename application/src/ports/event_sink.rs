//! Port for council lifecycle events.
//!
//! Defines the [`EventSink`] trait that receives [`CouncilEvent`]s as a run
//! progresses (stage start/complete, retries, fallbacks).
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while sinks receive structured events for
//! progress display and machine-readable logs (JSONL).

use council_domain::CouncilEvent;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::error;

/// Receiver of council lifecycle events.
///
/// `emit` is synchronous and non-fallible so that a slow or broken sink never
/// stalls or fails the run. Sink failures are the sink's own business.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &CouncilEvent);
}

/// No-op sink for tests and when nobody listens.
pub struct NoEvents;

impl EventSink for NoEvents {
    fn emit(&self, _event: &CouncilEvent) {}
}

/// A sink that delegates every event to multiple inner sinks, in order.
///
/// A panic in one inner sink is logged and does not keep the event from the
/// sinks after it.
///
/// ```text
/// StepOrchestrator ──emit──▶ CompositeEventSink
///                                 ├──▶ ProgressReporter (terminal)
///                                 └──▶ JsonlEventLog (file)
/// ```
#[derive(Default)]
pub struct CompositeEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl CompositeEventSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for CompositeEventSink {
    fn emit(&self, event: &CouncilEvent) {
        for (index, sink) in self.sinks.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| sink.emit(event))).is_err() {
                error!("Event sink {} panicked while handling {}", index, event.name());
            }
        }
    }
}

/// Forwards events into an unbounded channel so emission never blocks.
///
/// Events sent after the receiver is dropped are discarded.
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<CouncilEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CouncilEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: &CouncilEvent) {
        let _ = self.tx.send(event.clone());
    }
}
