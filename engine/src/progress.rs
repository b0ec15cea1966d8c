//! Progress events and the sinks that receive them.
//!
//! The orchestrator emits exactly one [`ProgressEvent`] before every attempt.
//! Sinks are plain trait objects so a logger, a test recorder, or a UI can
//! subscribe without the engine knowing how events are rendered.

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc;

/// Snapshot of the orchestrator state announced before an attempt runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Model about to be called.
    pub model_id: String,
    /// Position of that model in the roster (0-indexed).
    pub model_index: usize,
    /// Roster length.
    pub total_models: usize,
    /// Attempt number against this model (1-indexed).
    pub attempt_number: usize,
    /// Attempt budget per model.
    pub max_attempts_per_model: usize,
    /// `true` when this attempt repeats a model that just failed transiently.
    pub is_retrying: bool,
}

impl ProgressEvent {
    /// Whether this event announces a fallback to a lower-ranked model.
    #[must_use]
    pub const fn is_model_switch(&self) -> bool {
        !self.is_retrying && self.model_index > 0
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.is_retrying {
            "Retrying"
        } else if self.is_model_switch() {
            "Switching to"
        } else {
            "Calling"
        };
        write!(
            f,
            "{verb} {} (model {}/{}, attempt {}/{})",
            self.model_id,
            self.model_index + 1,
            self.total_models,
            self.attempt_number,
            self.max_attempts_per_model
        )
    }
}

/// Receives progress events. Calls are fire-and-forget.
pub trait ProgressReporter: Send + Sync {
    /// Handles one event. Must not block and must tolerate being called
    /// after the consumer stopped listening.
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: &ProgressEvent) {}
}

/// Logs every event through `tracing` at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: &ProgressEvent) {
        tracing::info!(
            model = %event.model_id,
            model_index = event.model_index,
            attempt = event.attempt_number,
            retrying = event.is_retrying,
            "{event}"
        );
    }
}

/// Forwards events into an unbounded channel for async consumers.
///
/// Send errors are ignored, so the receiver may be dropped at any time.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelReporter {
    /// Creates a reporter and the receiver end of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, event: &ProgressEvent) {
        let _ = self.sender.send(event.clone());
    }
}
