//! Configuration for extraction runs.

use std::time::Duration;

use crate::backoff::BackoffPolicy;

/// Default attempt budget per model.
pub const DEFAULT_MAX_ATTEMPTS_PER_MODEL: usize = 3;

/// Default per-attempt deadline.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default ceiling on document length sent to the model, in characters.
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 30_000;

/// Configuration for extraction retry behavior and prompt shaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Attempts per model before falling back to the next one (default: 3).
    pub max_attempts_per_model: usize,
    /// Wait schedule between retries of the same model (default: 4s doubling, 60s cap).
    pub backoff: BackoffPolicy,
    /// Deadline for a single attempt (default: 120 seconds).
    pub attempt_timeout: Duration,
    /// Documents longer than this are truncated before prompting (default: 30 000).
    pub max_document_chars: usize,
    /// How many questions to ask for; `None` lets the model decide.
    pub question_count: Option<usize>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_attempts_per_model: DEFAULT_MAX_ATTEMPTS_PER_MODEL,
            backoff: BackoffPolicy::default(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
            question_count: None,
        }
    }
}

impl ExtractionConfig {
    /// Set the attempt budget per model.
    #[must_use]
    pub const fn with_max_attempts_per_model(mut self, max: usize) -> Self {
        self.max_attempts_per_model = max;
        self
    }

    /// Set the backoff policy.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the per-attempt deadline.
    #[must_use]
    pub const fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Set the document length ceiling.
    #[must_use]
    pub const fn with_max_document_chars(mut self, max: usize) -> Self {
        self.max_document_chars = max;
        self
    }

    /// Ask the model for a specific number of questions.
    #[must_use]
    pub const fn with_question_count(mut self, count: usize) -> Self {
        self.question_count = Some(count);
        self
    }
}
