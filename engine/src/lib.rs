//! Resilient invocation engine for turning document text into quiz questions.
//!
//! The engine calls an unreliable generative-AI service through a
//! [`ModelTransport`], retrying transient overload failures with exponential
//! backoff and falling back across a ranked [`ModelRoster`]:
//!
//! - [`ExtractionPipeline`] - Entry point: prompt, orchestrate, parse
//! - [`RetryOrchestrator`] - Sequential retry/fallback state machine
//! - [`AttemptExecutor`] - One timed round trip to one model
//! - [`classify`] - Transient/fatal decision table for raw failures
//! - [`BackoffPolicy`] - Attempt number to wait duration
//! - [`ProgressReporter`] - Sink for per-attempt [`ProgressEvent`]s
//! - [`parse_questions`] - Parser for the textual question format
//!
//! ## Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use quizgen_engine::prelude::*;
//! # async fn example(transport: Arc<dyn ModelTransport>) -> Result<(), ExtractionError> {
//! let pipeline = ExtractionPipeline::new(transport);
//! let options = ExtractionOptions::default()
//!     .with_max_attempts_per_model(2)
//!     .with_reporter(|event: &ProgressEvent| println!("{event}"));
//!
//! let result = pipeline
//!     .extract_questions("Photosynthesis converts light into chemical energy.", "api-key", &options)
//!     .await?;
//! println!("{} questions from {}", result.len(), result.model_id);
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod classifier;
pub mod config;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod roster;

pub use backoff::BackoffPolicy;
pub use classifier::{classify, FailureKind};
pub use config::ExtractionConfig;
pub use error::{ClassifiedError, ExtractionError, OrchestrationError, ProviderFailure};
pub use executor::{AttemptExecutor, GenerateRequest, ModelTransport};
pub use metrics::{estimate_tokens, ExtractionMetrics};
pub use orchestrator::{Completion, RetryOrchestrator};
pub use parser::{parse_questions, ParseError, Question, QuestionOption};
pub use pipeline::{extract_questions, ExtractionOptions, ExtractionPipeline, ExtractionResult};
pub use progress::{ChannelReporter, NoopReporter, ProgressEvent, ProgressReporter, TracingReporter};
pub use roster::{ModelRoster, DEFAULT_MODELS};

/// Re-exported so callers can build cancellation tokens without a direct dependency.
pub use tokio_util::sync::CancellationToken;

/// Common types for ergonomic usage of the engine.
pub mod prelude {
    pub use crate::{
        BackoffPolicy, CancellationToken, ExtractionConfig, ExtractionError, ExtractionOptions,
        ExtractionPipeline, ExtractionResult, ModelRoster, ModelTransport, ProgressEvent,
        ProgressReporter, Question, QuestionOption,
    };
}
