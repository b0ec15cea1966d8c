//! Public error types for quizgen.

use gemini_adapter::GeminiError;
use quizgen_engine::ExtractionError;
use thiserror::Error;

/// Errors that can occur when extracting questions through [`Client`](crate::Client).
///
/// Engine errors pass through unchanged so callers can still tell overload
/// (`AllModelsExhausted`) apart from request problems (`FatalProvider`).
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was passed and `GEMINI_API_KEY` is unset or blank.
    #[error("Gemini API key not found. Set GEMINI_API_KEY or pass --api-key")]
    MissingApiKey,

    /// Error from the extraction engine.
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    /// Error setting up the Gemini transport.
    #[error("Gemini client error: {0}")]
    Gemini(GeminiError),
}

impl From<GeminiError> for Error {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingApiKey(_) => Self::MissingApiKey,
            other => Self::Gemini(other),
        }
    }
}

impl Error {
    /// Whether every model stayed overloaded; retrying later may succeed.
    #[must_use]
    pub const fn is_overloaded(&self) -> bool {
        matches!(self, Self::Extraction(e) if e.is_overloaded())
    }
}
