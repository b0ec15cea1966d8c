//! Retry and model-fallback state machine.
//!
//! ```text
//! Idle -> Attempting(m, k) -> Succeeded
//!                          -> Retrying(m, k + 1)      transient, k < max
//!                          -> AdvancingModel(m + 1)   transient, k == max, model left
//!                          -> Exhausted               transient, k == max, no model left
//!                          -> Fatal                   fatal, at any point
//! ```
//!
//! Attempts run strictly one after another. The only suspension points are
//! the transport round trip and the backoff wait; both race the caller's
//! cancellation token.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backoff::BackoffPolicy;
use crate::classifier::{classify, FailureKind};
use crate::error::{ClassifiedError, ExtractionError, OrchestrationError};
use crate::executor::AttemptExecutor;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::roster::ModelRoster;

/// Successful end of a run.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Raw text returned by the winning model.
    pub payload: String,
    /// Model that produced the payload.
    pub model_id: String,
    /// Roster position of that model.
    pub model_index: usize,
    /// Attempt number against that model.
    pub attempt_number: usize,
    /// Attempts made across all models, the successful one included.
    pub total_attempts: usize,
    /// Transient failures that preceded the success.
    pub history: Vec<ClassifiedError>,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}

/// Position of the run. Owned by a single `run` call and never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttemptState {
    model_index: usize,
    attempt_number: usize,
    is_retrying: bool,
}

impl AttemptState {
    const fn initial() -> Self {
        Self {
            model_index: 0,
            attempt_number: 1,
            is_retrying: false,
        }
    }
}

/// Drives an [`AttemptExecutor`] across attempts and models.
///
/// The roster and backoff policy are read-only; one orchestrator may serve
/// many concurrent runs, each with its own state.
#[derive(Debug, Clone)]
pub struct RetryOrchestrator {
    roster: ModelRoster,
    backoff: BackoffPolicy,
    max_attempts_per_model: usize,
}

impl RetryOrchestrator {
    /// Creates an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::InvalidInput` if `max_attempts_per_model` is zero.
    pub fn new(
        roster: ModelRoster,
        backoff: BackoffPolicy,
        max_attempts_per_model: usize,
    ) -> Result<Self, ExtractionError> {
        if max_attempts_per_model == 0 {
            return Err(ExtractionError::InvalidInput(
                "max_attempts_per_model must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            roster,
            backoff,
            max_attempts_per_model,
        })
    }

    /// Models tried, in order.
    #[must_use]
    pub const fn roster(&self) -> &ModelRoster {
        &self.roster
    }

    /// Attempt budget per model.
    #[must_use]
    pub const fn max_attempts_per_model(&self) -> usize {
        self.max_attempts_per_model
    }

    /// Runs attempts until one succeeds, a fatal failure occurs, every model
    /// is exhausted, or `cancel` fires.
    ///
    /// One [`ProgressEvent`] is reported before each attempt: `(0, 1)` first,
    /// `is_retrying: true` before each backoff wait, and `is_retrying: false`
    /// when switching models.
    ///
    /// # Errors
    ///
    /// - `OrchestrationError::Fatal` on the first fatal classification.
    /// - `OrchestrationError::Exhausted` with one error per failed attempt when
    ///   every model used its budget on transient failures.
    /// - `OrchestrationError::Cancelled` when the token fires.
    pub async fn run(
        &self,
        executor: &AttemptExecutor,
        prompt: &str,
        credential: &str,
        reporter: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<Completion, OrchestrationError> {
        let start = Instant::now();
        let mut state = AttemptState::initial();
        let mut history: Vec<ClassifiedError> = Vec::new();
        let mut attempts_made = 0;

        if cancel.is_cancelled() {
            return Err(OrchestrationError::Cancelled {
                attempts_made,
                history,
            });
        }
        reporter.report(&self.snapshot(state));

        loop {
            if cancel.is_cancelled() {
                return Err(OrchestrationError::Cancelled {
                    attempts_made,
                    history,
                });
            }

            let model_id = self.model_at(state.model_index);
            attempts_made += 1;
            debug!(
                model = model_id,
                attempt = state.attempt_number,
                max_attempts = self.max_attempts_per_model,
                "Sending attempt"
            );

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(OrchestrationError::Cancelled { attempts_made, history });
                }
                outcome = executor.execute(model_id, prompt, credential) => outcome,
            };

            let failure = match outcome {
                Ok(payload) => {
                    info!(
                        model = model_id,
                        attempt = state.attempt_number,
                        total_attempts = attempts_made,
                        "Attempt succeeded"
                    );
                    return Ok(Completion {
                        payload,
                        model_id: model_id.to_string(),
                        model_index: state.model_index,
                        attempt_number: state.attempt_number,
                        total_attempts: attempts_made,
                        history,
                        elapsed: start.elapsed(),
                    });
                }
                Err(failure) => failure,
            };

            let kind = classify(&failure);
            let classified = ClassifiedError {
                kind,
                model_id: model_id.to_string(),
                model_index: state.model_index,
                attempt_number: state.attempt_number,
                message: failure.to_string(),
                cause: failure,
                elapsed: start.elapsed(),
            };

            if kind == FailureKind::Fatal {
                error!(
                    model = model_id,
                    attempt = state.attempt_number,
                    "Fatal failure: {}",
                    classified.message
                );
                return Err(OrchestrationError::Fatal(classified));
            }

            warn!(
                model = model_id,
                attempt = state.attempt_number,
                "Transient failure: {}",
                classified.message
            );
            history.push(classified);

            let Some(next) = self.next_state(state) else {
                warn!(
                    models = self.roster.len(),
                    attempts = history.len(),
                    "All models exhausted"
                );
                return Err(OrchestrationError::Exhausted(history));
            };

            if cancel.is_cancelled() {
                return Err(OrchestrationError::Cancelled {
                    attempts_made,
                    history,
                });
            }
            reporter.report(&self.snapshot(next));

            if next.is_retrying {
                let delay = self.backoff.delay(state.attempt_number);
                debug!(model = model_id, delay = ?delay, "Backing off");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        return Err(OrchestrationError::Cancelled { attempts_made, history });
                    }
                    () = sleep(delay) => {}
                }
            } else {
                warn!(
                    from = model_id,
                    to = self.model_at(next.model_index),
                    "Falling back to next model"
                );
            }

            state = next;
        }
    }

    /// Where a transient failure at `state` leads, or `None` when exhausted.
    fn next_state(&self, state: AttemptState) -> Option<AttemptState> {
        if state.attempt_number < self.max_attempts_per_model {
            Some(AttemptState {
                model_index: state.model_index,
                attempt_number: state.attempt_number + 1,
                is_retrying: true,
            })
        } else if state.model_index + 1 < self.roster.len() {
            Some(AttemptState {
                model_index: state.model_index + 1,
                attempt_number: 1,
                is_retrying: false,
            })
        } else {
            None
        }
    }

    fn model_at(&self, index: usize) -> &str {
        // `next_state` never yields an index past the roster.
        &self.roster.as_slice()[index]
    }

    fn snapshot(&self, state: AttemptState) -> ProgressEvent {
        ProgressEvent {
            model_id: self.model_at(state.model_index).to_string(),
            model_index: state.model_index,
            total_models: self.roster.len(),
            attempt_number: state.attempt_number,
            max_attempts_per_model: self.max_attempts_per_model,
            is_retrying: state.is_retrying,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator(models: &[&str], max_attempts: usize) -> RetryOrchestrator {
        RetryOrchestrator::new(
            ModelRoster::new(models.iter().copied()).unwrap(),
            BackoffPolicy::default(),
            max_attempts,
        )
        .unwrap()
    }

    fn state(model_index: usize, attempt_number: usize, is_retrying: bool) -> AttemptState {
        AttemptState {
            model_index,
            attempt_number,
            is_retrying,
        }
    }

    #[test]
    fn test_rejects_zero_attempt_budget() {
        let err = RetryOrchestrator::new(ModelRoster::default(), BackoffPolicy::default(), 0)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidInput(_)));
    }

    #[test]
    fn test_retries_same_model_under_budget() {
        let orch = orchestrator(&["a", "b"], 3);
        assert_eq!(orch.next_state(state(0, 1, false)), Some(state(0, 2, true)));
        assert_eq!(orch.next_state(state(0, 2, true)), Some(state(0, 3, true)));
    }

    #[test]
    fn test_advances_model_when_budget_spent() {
        let orch = orchestrator(&["a", "b"], 3);
        assert_eq!(orch.next_state(state(0, 3, true)), Some(state(1, 1, false)));
    }

    #[test]
    fn test_exhausts_after_last_model() {
        let orch = orchestrator(&["a", "b"], 3);
        assert_eq!(orch.next_state(state(1, 3, true)), None);

        let single = orchestrator(&["a"], 1);
        assert_eq!(single.next_state(AttemptState::initial()), None);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let orch = orchestrator(&["a", "b"], 2);
        let event = orch.snapshot(state(1, 1, false));
        assert_eq!(event.model_id, "b");
        assert_eq!(event.total_models, 2);
        assert_eq!(event.max_attempts_per_model, 2);
        assert!(event.is_model_switch());
    }
}
