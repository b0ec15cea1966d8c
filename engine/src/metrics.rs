//! Metrics and token estimation for extraction runs.

use std::time::Duration;

use serde::Serialize;

/// Metrics collected during a successful extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionMetrics {
    /// Attempts made across all models, the successful one included.
    pub total_attempts: usize,
    /// Distinct models called.
    pub models_tried: usize,
    /// Wall-clock time of the run, backoff waits included.
    pub wall_time: Duration,
    /// Estimated tokens in the prompt sent to the winning model.
    pub estimated_input_tokens: usize,
    /// Estimated tokens in the winning model's output.
    pub estimated_output_tokens: usize,
}

/// Estimate token count from text using the 4-chars-per-token heuristic.
///
/// Counts `chars()` rather than bytes and rounds up.
///
/// # Examples
///
/// ```
/// use quizgen_engine::estimate_tokens;
///
/// assert_eq!(estimate_tokens("hello"), 2);
/// assert_eq!(estimate_tokens("hello world"), 3);
/// ```
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
