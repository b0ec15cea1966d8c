//! End-to-end extraction: prompt, orchestrate, parse.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ExtractionConfig;
use crate::error::{ClassifiedError, ExtractionError, OrchestrationError, ProviderFailure};
use crate::executor::{AttemptExecutor, ModelTransport};
use crate::metrics::{estimate_tokens, ExtractionMetrics};
use crate::orchestrator::RetryOrchestrator;
use crate::parser::{parse_questions, Question};
use crate::progress::{NoopReporter, ProgressReporter};
use crate::prompt::{build_extraction_prompt, truncate_document};
use crate::roster::ModelRoster;

/// How many trailing failure messages the exhaustion summary quotes.
const SUMMARY_MESSAGES: usize = 3;

/// Per-call options for [`ExtractionPipeline::extract_questions`].
#[derive(Clone)]
pub struct ExtractionOptions {
    /// Models to try, most preferred first (default: [`DEFAULT_MODELS`](crate::DEFAULT_MODELS)).
    pub roster: ModelRoster,
    /// Retry, timeout and prompt settings.
    pub config: ExtractionConfig,
    /// Receives one event per attempt (default: no-op).
    pub reporter: Arc<dyn ProgressReporter>,
    /// Cancels the run before the next attempt or during a backoff wait.
    pub cancel: CancellationToken,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            roster: ModelRoster::default(),
            config: ExtractionConfig::default(),
            reporter: Arc::new(NoopReporter),
            cancel: CancellationToken::new(),
        }
    }
}

impl std::fmt::Debug for ExtractionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionOptions")
            .field("roster", &self.roster)
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl ExtractionOptions {
    /// Set the model roster.
    #[must_use]
    pub fn with_roster(mut self, roster: ModelRoster) -> Self {
        self.roster = roster;
        self
    }

    /// Set the attempt budget per model.
    #[must_use]
    pub fn with_max_attempts_per_model(mut self, max: usize) -> Self {
        self.config.max_attempts_per_model = max;
        self
    }

    /// Replace the whole engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the progress sink.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Set the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Questions extracted from one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Parsed questions in model order.
    pub questions: Vec<Question>,
    /// Model whose output was parsed.
    pub model_id: String,
    /// Attempt and timing metrics.
    pub metrics: ExtractionMetrics,
}

impl ExtractionResult {
    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether no questions were extracted (never true for a successful parse).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Iterates questions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}

impl IntoIterator for ExtractionResult {
    type Item = Question;
    type IntoIter = std::vec::IntoIter<Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExtractionResult {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

/// Top-level entry point binding a transport to the retry engine.
///
/// Cheap to clone; clones share the transport. Each call owns its own
/// orchestration state, so calls may run concurrently.
#[derive(Clone)]
pub struct ExtractionPipeline {
    transport: Arc<dyn ModelTransport>,
}

impl ExtractionPipeline {
    /// Creates a pipeline over `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn ModelTransport>) -> Self {
        Self { transport }
    }

    /// Extracts quiz questions from already-extracted document text.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for blank text or credential, or a zero attempt budget.
    /// - `FatalProvider` on the first non-retryable provider failure.
    /// - `AllModelsExhausted` when every model stayed overloaded.
    /// - `MalformedResponse` when the winning output does not parse or holds no text. Not retried.
    /// - `Cancelled` when `options.cancel` fires.
    pub async fn extract_questions(
        &self,
        document_text: &str,
        credential: &str,
        options: &ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        if document_text.trim().is_empty() {
            return Err(ExtractionError::InvalidInput(
                "document text is empty".to_string(),
            ));
        }
        if credential.trim().is_empty() {
            return Err(ExtractionError::InvalidInput(
                "credential is empty".to_string(),
            ));
        }

        let config = &options.config;
        let orchestrator = RetryOrchestrator::new(
            options.roster.clone(),
            config.backoff,
            config.max_attempts_per_model,
        )?;

        let (document, truncated) = truncate_document(document_text, config.max_document_chars);
        if truncated {
            warn!(
                max_chars = config.max_document_chars,
                "Document truncated before prompting"
            );
        }
        let prompt = build_extraction_prompt(document, config);

        let executor = AttemptExecutor::new(Arc::clone(&self.transport), config.attempt_timeout);
        let completion = orchestrator
            .run(
                &executor,
                &prompt,
                credential,
                options.reporter.as_ref(),
                &options.cancel,
            )
            .await
            .map_err(|e| aggregate_failure(e, config.max_attempts_per_model))?;

        let questions = parse_questions(&completion.payload).map_err(|e| {
            warn!(model = %completion.model_id, "Unparseable model output: {e}");
            ExtractionError::MalformedResponse {
                model_id: completion.model_id.clone(),
                message: e.to_string(),
                raw_text: completion.payload.clone(),
            }
        })?;

        let metrics = ExtractionMetrics {
            total_attempts: completion.total_attempts,
            models_tried: completion.model_index + 1,
            wall_time: completion.elapsed,
            estimated_input_tokens: estimate_tokens(&prompt),
            estimated_output_tokens: estimate_tokens(&completion.payload),
        };

        info!(
            model = %completion.model_id,
            questions = questions.len(),
            attempts = metrics.total_attempts,
            wall_time = ?metrics.wall_time,
            "Extraction complete"
        );

        Ok(ExtractionResult {
            questions,
            model_id: completion.model_id,
            metrics,
        })
    }
}

/// Convenience wrapper: builds a pipeline over `transport` and runs one extraction.
///
/// # Errors
///
/// See [`ExtractionPipeline::extract_questions`].
pub async fn extract_questions(
    transport: Arc<dyn ModelTransport>,
    document_text: &str,
    credential: &str,
    options: &ExtractionOptions,
) -> Result<ExtractionResult, ExtractionError> {
    ExtractionPipeline::new(transport)
        .extract_questions(document_text, credential, options)
        .await
}

/// Turns an orchestration failure into the caller-facing error.
fn aggregate_failure(error: OrchestrationError, attempts_per_model: usize) -> ExtractionError {
    match error {
        // The model answered, but with nothing usable; not a rejected request.
        OrchestrationError::Fatal(error)
            if matches!(error.cause, ProviderFailure::InvalidResponse(_)) =>
        {
            ExtractionError::MalformedResponse {
                model_id: error.model_id,
                message: error.message,
                raw_text: String::new(),
            }
        }
        OrchestrationError::Fatal(error) => ExtractionError::FatalProvider {
            model_id: error.model_id.clone(),
            error,
        },
        OrchestrationError::Exhausted(history) => ExtractionError::AllModelsExhausted {
            models_tried: models_tried(&history),
            attempts_per_model,
            total_attempts: history.len(),
            summary: summarize(&history),
            history,
        },
        OrchestrationError::Cancelled { attempts_made, .. } => {
            ExtractionError::Cancelled { attempts_made }
        }
    }
}

fn models_tried(history: &[ClassifiedError]) -> usize {
    history.last().map_or(0, |e| e.model_index + 1)
}

fn summarize(history: &[ClassifiedError]) -> String {
    let skip = history.len().saturating_sub(SUMMARY_MESSAGES);
    history[skip..]
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FailureKind;
    use std::time::Duration;

    fn transient(model_index: usize, attempt_number: usize) -> ClassifiedError {
        ClassifiedError {
            kind: FailureKind::Transient,
            model_id: format!("m{model_index}"),
            model_index,
            attempt_number,
            message: "HTTP 503: overloaded".to_string(),
            cause: ProviderFailure::status(503, "overloaded"),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_summary_quotes_last_three_failures() {
        let history: Vec<_> = (0..2)
            .flat_map(|m| (1..=2).map(move |a| transient(m, a)))
            .collect();
        let summary = summarize(&history);
        assert!(!summary.contains("[m0 attempt 1]"));
        assert!(summary.contains("[m0 attempt 2]"));
        assert!(summary.contains("[m1 attempt 2]"));
        assert_eq!(summary.matches("HTTP 503").count(), 3);
    }

    #[test]
    fn test_exhaustion_becomes_aggregate() {
        let history = vec![transient(0, 1), transient(1, 1)];
        let err = aggregate_failure(OrchestrationError::Exhausted(history), 1);
        match err {
            ExtractionError::AllModelsExhausted {
                models_tried,
                attempts_per_model,
                total_attempts,
                ..
            } => {
                assert_eq!(models_tried, 2);
                assert_eq!(attempts_per_model, 1);
                assert_eq!(total_attempts, 2);
            }
            other => panic!("expected AllModelsExhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_response_becomes_malformed() {
        let error = ClassifiedError {
            kind: FailureKind::Fatal,
            cause: ProviderFailure::InvalidResponse("prompt blocked: SAFETY".to_string()),
            message: "Invalid response: prompt blocked: SAFETY".to_string(),
            ..transient(0, 1)
        };
        let err = aggregate_failure(OrchestrationError::Fatal(error), 3);
        assert!(matches!(
            err,
            ExtractionError::MalformedResponse { ref model_id, .. } if model_id == "m0"
        ));
    }

    #[test]
    fn test_options_builders() {
        let options = ExtractionOptions::default()
            .with_roster(ModelRoster::new(["only"]).unwrap())
            .with_max_attempts_per_model(7);
        assert_eq!(options.roster.len(), 1);
        assert_eq!(options.config.max_attempts_per_model, 7);
        assert!(format!("{options:?}").contains("ExtractionOptions"));
    }
}
