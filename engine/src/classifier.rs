//! Transient/fatal classification of raw provider failures.
//!
//! This is the single decision point for whether the orchestrator spends
//! more attempts or aborts. It is an explicit table rather than message
//! matching:
//!
//! | Failure | Kind |
//! |---------|------|
//! | HTTP 502, 503 | Transient |
//! | Any status with provider code `UNAVAILABLE`, `OVERLOADED`, `overloaded_error` | Transient |
//! | Any other HTTP status (400, 401, 403, 404, 429, 500, ...) | Fatal |
//! | Per-attempt timeout | Transient |
//! | Network error | Fatal |
//! | Invalid/empty response body | Fatal |

use serde::Serialize;

use crate::error::ProviderFailure;

/// Whether a failed attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Temporary overload; retry or fall back to the next model.
    Transient,
    /// Will fail again however often it is repeated; abort the run.
    Fatal,
}

/// HTTP statuses that signal temporary overload.
pub const TRANSIENT_STATUSES: &[u16] = &[502, 503];

/// Provider status codes that signal temporary overload (matched case-insensitively).
pub const TRANSIENT_PROVIDER_CODES: &[&str] = &["UNAVAILABLE", "OVERLOADED", "overloaded_error"];

/// Classifies a raw failure.
///
/// # Examples
///
/// ```
/// use quizgen_engine::{classify, FailureKind, ProviderFailure};
///
/// assert_eq!(classify(&ProviderFailure::status(503, "busy")), FailureKind::Transient);
/// assert_eq!(classify(&ProviderFailure::status(401, "bad key")), FailureKind::Fatal);
/// ```
#[must_use]
pub fn classify(failure: &ProviderFailure) -> FailureKind {
    match failure {
        ProviderFailure::Status { status, code, .. } => {
            let overloaded_code = code.as_deref().is_some_and(is_transient_code);
            if TRANSIENT_STATUSES.contains(status) || overloaded_code {
                FailureKind::Transient
            } else {
                FailureKind::Fatal
            }
        }
        ProviderFailure::Timeout(_) => FailureKind::Transient,
        ProviderFailure::Network(_) | ProviderFailure::InvalidResponse(_) => FailureKind::Fatal,
    }
}

fn is_transient_code(code: &str) -> bool {
    TRANSIENT_PROVIDER_CODES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(code.trim()))
}
