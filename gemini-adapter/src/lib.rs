//! Gemini REST adapter for the quizgen engine.
//!
//! This crate provides credential discovery, request construction, and a
//! [`GeminiClient`] implementing [`quizgen_engine::ModelTransport`] over the
//! `models/{model}:generateContent` endpoint. It performs one round trip per
//! call; retry and fallback stay in the engine.

/// HTTP client implementing the engine transport.
pub mod client;
/// Discovery of the API key and base URL from the environment.
pub mod discovery;
/// Error types returned by adapter setup.
pub mod error;
/// Request body construction.
pub mod request;
/// Wire types and adapter configuration.
pub mod types;

pub use client::GeminiClient;
pub use discovery::{discover_api_key, discover_base_url, API_KEY_ENV_VAR, BASE_URL_ENV_VAR};
pub use error::GeminiError;
pub use types::{GeminiConfig, DEFAULT_BASE_URL};
