//! Ranked list of model identifiers tried in priority order.

use std::sync::Arc;

use crate::error::ExtractionError;

/// Built-in roster, most preferred first.
pub const DEFAULT_MODELS: [&str; 5] = [
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
    "gemini-1.5-flash",
];

/// Ordered, immutable, non-empty list of model identifiers.
///
/// Insertion order is priority order. Cloning is cheap and clones share the
/// same backing list, so one roster can serve many concurrent extractions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoster {
    models: Arc<[String]>,
}

impl Default for ModelRoster {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODELS.iter().map(|m| (*m).to_string()).collect(),
        }
    }
}

impl ModelRoster {
    /// Builds a roster from model identifiers, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Config` if the list is empty or an identifier is blank.
    pub fn new<I, S>(models: I) -> Result<Self, ExtractionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models = models
            .into_iter()
            .map(|m| {
                let id: String = m.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    Err(ExtractionError::Config(
                        "model roster contains a blank identifier".to_string(),
                    ))
                } else {
                    Ok(trimmed.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        if models.is_empty() {
            return Err(ExtractionError::Config(
                "model roster must contain at least one model".to_string(),
            ));
        }

        Ok(Self {
            models: models.into(),
        })
    }

    /// Parses a comma-separated list such as `"gemini-2.5-flash, gemini-2.0-flash"`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Config` if no identifiers remain after splitting.
    pub fn parse_list(list: &str) -> Result<Self, ExtractionError> {
        Self::new(list.split(',').map(str::trim).filter(|m| !m.is_empty()))
    }

    /// Number of models in the roster (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Always `false`; a roster cannot be constructed empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Model at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.models.get(index).map(String::as_str)
    }

    /// Iterates model identifiers in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }

    /// Model identifiers as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.models
    }
}
