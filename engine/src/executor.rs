//! Single-shot model calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::error::ProviderFailure;

/// One request against one model.
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    /// Model identifier from the roster.
    pub model: &'a str,
    /// Full prompt text.
    pub prompt: &'a str,
    /// Opaque API credential supplied by the caller.
    pub credential: &'a str,
}

/// The "send prompt, get text" primitive the engine is built on.
///
/// Implementations perform exactly one round trip and never retry.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Sends the prompt and returns the generated text.
    ///
    /// # Errors
    ///
    /// Returns the raw [`ProviderFailure`] for any unsuccessful round trip.
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<String, ProviderFailure>;
}

#[async_trait]
impl<T> ModelTransport for Arc<T>
where
    T: ModelTransport + ?Sized,
{
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<String, ProviderFailure> {
        (**self).generate(request).await
    }
}

/// Performs one timed attempt against one model.
///
/// Holds no retry logic; that belongs to the orchestrator.
#[derive(Clone)]
pub struct AttemptExecutor {
    transport: Arc<dyn ModelTransport>,
    timeout: Duration,
}

impl AttemptExecutor {
    /// Creates an executor that abandons any attempt running longer than `timeout`.
    #[must_use]
    pub fn new(transport: Arc<dyn ModelTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Per-attempt deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one attempt.
    ///
    /// # Errors
    ///
    /// Returns the transport's failure unchanged, or `ProviderFailure::Timeout`
    /// when the deadline passes. A blank payload is returned as-is; deciding
    /// whether text is usable belongs to the parser.
    pub async fn execute(
        &self,
        model: &str,
        prompt: &str,
        credential: &str,
    ) -> Result<String, ProviderFailure> {
        let request = GenerateRequest {
            model,
            prompt,
            credential,
        };

        timeout(self.timeout, self.transport.generate(request))
            .await
            .unwrap_or(Err(ProviderFailure::Timeout(self.timeout)))
    }
}
