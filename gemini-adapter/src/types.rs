//! Wire types for the `generateContent` endpoint and adapter configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for a [`GeminiClient`](crate::GeminiClient).
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root, without a trailing `/models`.
    pub base_url: String,
    /// HTTP-level timeout for one request (default: 120 seconds).
    pub timeout: Duration,
    /// Sampling temperature (default: 0.2, favoring stable formatting).
    pub temperature: f32,
    /// Upper bound on generated tokens; `None` uses the model default.
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            temperature: 0.2,
            max_output_tokens: None,
        }
    }
}

impl GeminiConfig {
    /// Default configuration with the base URL taken from `GEMINI_BASE_URL` when set.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: crate::discovery::discover_base_url(),
            ..Self::default()
        }
    }

    /// Set the API root (e.g. a proxy or a mock server).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the HTTP-level timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the number of generated tokens.
    #[must_use]
    pub const fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    /// Conversation turns; a single user turn here.
    pub contents: Vec<Content<'a>>,
    /// Sampling settings.
    pub generation_config: GenerationConfig,
}

/// One conversation turn.
#[derive(Debug, Serialize)]
pub struct Content<'a> {
    /// Speaker; always `user` for requests.
    pub role: &'a str,
    /// Text parts of the turn.
    pub parts: Vec<Part<'a>>,
}

/// One text part of a request turn.
#[derive(Debug, Serialize)]
pub struct Part<'a> {
    /// Part text.
    pub text: &'a str,
}

/// Sampling settings sent with every request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional cap on generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// Successful `generateContent` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates; the first is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Present when the prompt itself was blocked.
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or `None` when it has no text parts.
    ///
    /// Blank text is returned as-is so the parser can report it.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let mut texts = parts.iter().filter_map(|p| p.text.as_deref()).peekable();
        texts.peek()?;
        Some(texts.collect())
    }

    /// Why no text was returned, for diagnostics.
    #[must_use]
    pub fn empty_reason(&self) -> String {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return format!("prompt blocked: {reason}");
        }
        match self.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            Some(reason) => format!("no text in candidate (finish reason {reason})"),
            None => "response contained no candidates".to_string(),
        }
    }
}

/// One generated candidate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content; absent when generation was stopped early.
    pub content: Option<CandidateContent>,
    /// Why generation stopped (`STOP`, `MAX_TOKENS`, `SAFETY`, ...).
    pub finish_reason: Option<String>,
}

/// Content of a candidate.
#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    /// Generated parts.
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// One generated part.
#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    /// Text, absent for non-text parts.
    pub text: Option<String>,
}

/// Feedback about the prompt.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was blocked.
    pub block_reason: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    /// Error details.
    pub error: ApiError,
}

/// Error details.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    /// Numeric HTTP-style code.
    pub code: Option<u16>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Canonical status string such as `UNAVAILABLE` or `INVALID_ARGUMENT`.
    pub status: Option<String>,
}
