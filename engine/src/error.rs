//! Error types for extraction runs, from raw provider failures up to the
//! caller-facing aggregate.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::classifier::FailureKind;

/// Raw failure of a single attempt, as reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderFailure {
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Provider-specific status string (e.g. `UNAVAILABLE`), when the body carried one.
        code: Option<String>,
        /// Error message reported by the provider, or the raw body.
        message: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The attempt did not finish within the per-attempt deadline.
    #[error("Attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered successfully but the body held no usable text.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderFailure {
    /// Builds a [`ProviderFailure::Status`] without a provider code.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Builds a [`ProviderFailure::Status`] carrying a provider status code.
    #[must_use]
    pub fn status_with_code(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// A failed attempt after classification. One is recorded per failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    /// Transient or fatal.
    pub kind: FailureKind,
    /// Model the attempt was sent to.
    pub model_id: String,
    /// Position of that model in the roster (0-indexed).
    pub model_index: usize,
    /// Attempt number against that model (1-indexed).
    pub attempt_number: usize,
    /// Human-readable message, taken from the raw failure.
    pub message: String,
    /// The raw failure as returned by the transport.
    pub cause: ProviderFailure,
    /// Time since the run started when this attempt failed.
    pub elapsed: Duration,
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} attempt {}] {}",
            self.model_id, self.attempt_number, self.message
        )
    }
}

/// Terminal failure of a [`RetryOrchestrator`](crate::RetryOrchestrator) run.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// The first fatal classification ends the run; nothing else is tried.
    #[error("Fatal provider error: {0}")]
    Fatal(ClassifiedError),

    /// Every roster entry used up its attempt budget on transient failures.
    #[error("All models exhausted after {} failed attempts", .0.len())]
    Exhausted(Vec<ClassifiedError>),

    /// The caller's cancellation token fired.
    #[error("Cancelled after {attempts_made} attempts")]
    Cancelled {
        /// Attempts started before cancellation.
        attempts_made: usize,
        /// Transient failures recorded before cancellation.
        history: Vec<ClassifiedError>,
    },
}

/// Errors surfaced to callers of [`ExtractionPipeline`](crate::ExtractionPipeline).
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// A non-retryable failure (bad credential, malformed request, quota).
    #[error("Request rejected by {model_id}: {error}")]
    FatalProvider {
        /// Model that rejected the request.
        model_id: String,
        /// The single classified failure that ended the run.
        error: ClassifiedError,
    },

    /// Every model stayed overloaded for its full attempt budget.
    #[error(
        "All models overloaded: tried {models_tried} models, {attempts_per_model} attempts each \
         ({total_attempts} attempts). Last errors: {summary}"
    )]
    AllModelsExhausted {
        /// Number of distinct models tried.
        models_tried: usize,
        /// Attempt budget per model.
        attempts_per_model: usize,
        /// Total failed attempts across all models.
        total_attempts: usize,
        /// The last few failure messages, joined for display.
        summary: String,
        /// Every failed attempt in order.
        history: Vec<ClassifiedError>,
    },

    /// The model answered but its text did not follow the question format.
    #[error("Malformed response from {model_id}: {message}")]
    MalformedResponse {
        /// Model whose output failed to parse.
        model_id: String,
        /// Parser diagnostic.
        message: String,
        /// The unparsed model output.
        raw_text: String,
    },

    /// The caller cancelled the extraction.
    #[error("Extraction cancelled after {attempts_made} attempts")]
    Cancelled {
        /// Attempts started before cancellation.
        attempts_made: usize,
    },

    /// Rejected before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid roster or engine configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractionError {
    /// Failed attempts recorded before the error, in order.
    #[must_use]
    pub fn history(&self) -> &[ClassifiedError] {
        match self {
            Self::AllModelsExhausted { history, .. } => history,
            Self::FatalProvider { error, .. } => std::slice::from_ref(error),
            _ => &[],
        }
    }

    /// Whether the failure came from service overload rather than the request itself.
    #[must_use]
    pub const fn is_overloaded(&self) -> bool {
        matches!(self, Self::AllModelsExhausted { .. })
    }
}
