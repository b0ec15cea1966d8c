//! Request construction for `generateContent` calls.

use crate::types::{Content, GeminiConfig, GenerateContentRequest, GenerationConfig, Part};

/// Builds the `generateContent` body for a single-turn prompt.
#[must_use]
pub fn build_request<'a>(prompt: &'a str, config: &GeminiConfig) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        },
    }
}

/// Endpoint URL for `model` under `base_url`.
#[must_use]
pub fn endpoint(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}
