//! Common imports for quizgen usage.
//!
//! ```
//! use quizgen::prelude::*;
//! ```

pub use crate::client::Client;
pub use crate::errors::Error;

// Engine types needed to configure a run and read its result
pub use quizgen_engine::prelude::*;

pub use gemini_adapter::GeminiConfig;
