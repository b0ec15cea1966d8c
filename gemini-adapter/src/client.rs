//! HTTP client for the `generateContent` endpoint.

use async_trait::async_trait;
use quizgen_engine::{GenerateRequest, ModelTransport, ProviderFailure};
use reqwest::StatusCode;

use crate::error::GeminiError;
use crate::request::{build_request, endpoint};
use crate::types::{ErrorEnvelope, GeminiConfig, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini transport. One `generate` call is one HTTP round trip.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::InvalidConfig` for a blank base URL or
    /// `GeminiError::HttpClient` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        if config.base_url.trim().is_empty() {
            return Err(GeminiError::InvalidConfig(
                "base URL must not be blank".to_string(),
            ));
        }
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Creates a client from [`GeminiConfig::from_env`].
    ///
    /// # Errors
    ///
    /// See [`GeminiClient::new`].
    pub fn from_env() -> Result<Self, GeminiError> {
        Self::new(GeminiConfig::from_env())
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Full endpoint URL for `model`.
    #[must_use]
    pub fn endpoint(&self, model: &str) -> String {
        endpoint(&self.config.base_url, model)
    }

    /// Sends one prompt to `model` and returns the generated text.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderFailure`] describing the failed round trip:
    /// `Status` for non-2xx answers, `Timeout` when the HTTP timeout fires,
    /// `Network` when no response arrived, and `InvalidResponse` when the
    /// body carried no text.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        api_key: &str,
    ) -> Result<String, ProviderFailure> {
        let url = self.endpoint(model);
        tracing::debug!(model, url = %url, prompt_chars = prompt.len(), "Sending generateContent request");

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&build_request(prompt, &self.config))
            .send()
            .await
            .map_err(|e| self.transport_failure(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_failure(&e))?;

        if !status.is_success() {
            let failure = status_failure(status, &body);
            tracing::debug!(model, status = status.as_u16(), error = %failure, "generateContent failed");
            return Err(failure);
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderFailure::InvalidResponse(format!("could not decode response body: {e}"))
        })?;

        parsed
            .text()
            .ok_or_else(|| ProviderFailure::InvalidResponse(parsed.empty_reason()))
    }

    fn transport_failure(&self, err: &reqwest::Error) -> ProviderFailure {
        if err.is_timeout() {
            ProviderFailure::Timeout(self.config.timeout)
        } else {
            ProviderFailure::Network(err.to_string())
        }
    }
}

/// Maps a non-2xx answer to a [`ProviderFailure::Status`], reading the
/// provider status string from the error envelope when the body has one.
fn status_failure(status: StatusCode, body: &str) -> ProviderFailure {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ProviderFailure::Status {
            status: status.as_u16(),
            code: envelope.error.status,
            message: if envelope.error.message.is_empty() {
                status.to_string()
            } else {
                envelope.error.message
            },
        },
        Err(_) => {
            let trimmed = body.trim();
            let message = if trimmed.is_empty() {
                status.to_string()
            } else {
                trimmed.chars().take(500).collect()
            };
            ProviderFailure::status(status.as_u16(), message)
        }
    }
}

#[async_trait]
impl ModelTransport for GeminiClient {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<String, ProviderFailure> {
        self.generate_content(request.model, request.prompt, request.credential)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failure_reads_envelope() {
        let body = r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;
        let failure = status_failure(StatusCode::SERVICE_UNAVAILABLE, body);
        assert_eq!(
            failure,
            ProviderFailure::status_with_code(503, "UNAVAILABLE", "The model is overloaded.")
        );
    }

    #[test]
    fn test_status_failure_falls_back_to_raw_body() {
        let failure = status_failure(StatusCode::BAD_GATEWAY, "upstream connect error");
        assert_eq!(
            failure,
            ProviderFailure::status(502, "upstream connect error")
        );
    }

    #[test]
    fn test_status_failure_with_empty_body() {
        let failure = status_failure(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(
            failure,
            ProviderFailure::status(500, "500 Internal Server Error")
        );
    }

    #[test]
    fn test_blank_base_url_is_rejected() {
        let err = GeminiClient::new(GeminiConfig::default().with_base_url(" ")).unwrap_err();
        assert!(matches!(err, GeminiError::InvalidConfig(_)));
    }
}
