//! # quizgen
//!
//! Turn document text into multiple-choice quiz questions, surviving
//! overloaded models.
//!
//! This crate binds the Gemini transport from `gemini-adapter` to the retry
//! and fallback engine in `quizgen-engine`. Transient overload answers are
//! retried with exponential backoff, then the next model in the roster is
//! tried; request errors stop immediately.
//!
//! ## Example
//!
//! ```no_run
//! # use quizgen::prelude::*;
//! # async fn example() -> Result<(), Error> {
//! let client = Client::from_env()?;
//!
//! let options = ExtractionOptions::default()
//!     .with_max_attempts_per_model(2)
//!     .with_reporter(|event: &ProgressEvent| eprintln!("{event}"));
//!
//! let result = client.extract_with("Water boils at 100 degrees Celsius at sea level.", &options).await?;
//! println!("{} questions from {}", result.len(), result.model_id);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

/// Gemini-backed extraction client.
pub mod client;

/// Public error types.
pub mod errors;

/// Text and JSON rendering of results.
pub mod output;

/// Commonly used types.
pub mod prelude;

pub use client::Client;
pub use errors::Error;
