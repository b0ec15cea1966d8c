//! Discovery of the Gemini API key and endpoint.

use crate::error::GeminiError;
use crate::types::DEFAULT_BASE_URL;

/// Environment variable holding the API key.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Environment variable that overrides the default API base URL.
pub const BASE_URL_ENV_VAR: &str = "GEMINI_BASE_URL";

/// Locates the API key.
///
/// Resolution order:
/// 1. `explicit` if provided and non-blank.
/// 2. The `GEMINI_API_KEY` environment variable.
///
/// # Errors
///
/// Returns `GeminiError::MissingApiKey` when neither source yields a key.
pub fn discover_api_key(explicit: Option<String>) -> Result<String, GeminiError> {
    if let Some(key) = explicit {
        if !key.trim().is_empty() {
            return Ok(key);
        }
        return Err(GeminiError::MissingApiKey(
            "explicit API key is blank".to_string(),
        ));
    }

    match std::env::var(API_KEY_ENV_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(GeminiError::MissingApiKey(format!(
            "set {API_KEY_ENV_VAR} or pass a key explicitly"
        ))),
    }
}

/// Returns `GEMINI_BASE_URL` if set, otherwise [`DEFAULT_BASE_URL`].
#[must_use]
pub fn discover_base_url() -> String {
    std::env::var(BASE_URL_ENV_VAR)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}
