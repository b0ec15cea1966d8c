use thiserror::Error;

/// Errors raised while setting up a [`GeminiClient`](crate::GeminiClient).
///
/// Per-request failures are reported as engine `ProviderFailure`s instead.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// No usable API key was supplied or found in the environment.
    #[error("Gemini API key not found: {0}")]
    MissingApiKey(String),

    /// The reqwest client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The configuration is unusable (e.g. blank base URL).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
