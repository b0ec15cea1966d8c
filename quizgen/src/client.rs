//! Gemini-backed question extraction client.
//!
//! # Example
//!
//! ```no_run
//! # use quizgen::Client;
//! # async fn example() -> Result<(), quizgen::Error> {
//! // Reads GEMINI_API_KEY (and GEMINI_BASE_URL if set)
//! let client = Client::from_env()?;
//!
//! let result = client.extract("The mitochondrion produces most of a cell's ATP.").await?;
//! for question in &result {
//!     println!("{}", question.text);
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use gemini_adapter::{discover_api_key, GeminiClient, GeminiConfig};
use quizgen_engine::{ExtractionOptions, ExtractionPipeline, ExtractionResult};

use crate::errors::Error;

/// Quiz extraction client.
///
/// Binds a [`GeminiClient`] transport and an API key to an
/// [`ExtractionPipeline`]. Clones share the HTTP connection pool, and calls
/// may run concurrently.
#[derive(Clone)]
pub struct Client {
    pipeline: ExtractionPipeline,
    api_key: String,
    options: ExtractionOptions,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for `api_key` against the default Gemini endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingApiKey` for a blank key, or `Error::Gemini` if
    /// the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::with_config(api_key, GeminiConfig::default())
    }

    /// Creates a client for `api_key` with a custom transport configuration.
    ///
    /// # Errors
    ///
    /// See [`Client::new`].
    pub fn with_config(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self, Error> {
        let api_key = discover_api_key(Some(api_key.into()))?;
        let transport = GeminiClient::new(config)?;
        Ok(Self {
            pipeline: ExtractionPipeline::new(Arc::new(transport)),
            api_key,
            options: ExtractionOptions::default(),
        })
    }

    /// Creates a client from `GEMINI_API_KEY` and `GEMINI_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingApiKey` when `GEMINI_API_KEY` is unset or blank.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = discover_api_key(None)?;
        Self::with_config(api_key, GeminiConfig::from_env())
    }

    /// Replace the options used by [`Client::extract`].
    #[must_use]
    pub fn with_options(mut self, options: ExtractionOptions) -> Self {
        self.options = options;
        self
    }

    /// Options used by [`Client::extract`].
    #[must_use]
    pub const fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// Extracts questions using the client's options.
    ///
    /// # Errors
    ///
    /// Returns `Error::Extraction` for any engine failure.
    pub async fn extract(&self, document_text: &str) -> Result<ExtractionResult, Error> {
        self.extract_with(document_text, &self.options).await
    }

    /// Extracts questions with per-call options.
    ///
    /// # Errors
    ///
    /// Returns `Error::Extraction` for any engine failure.
    pub async fn extract_with(
        &self,
        document_text: &str,
        options: &ExtractionOptions,
    ) -> Result<ExtractionResult, Error> {
        Ok(self
            .pipeline
            .extract_questions(document_text, &self.api_key, options)
            .await?)
    }
}
