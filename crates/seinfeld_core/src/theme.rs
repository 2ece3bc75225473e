//! The episode theme that drives a pipeline run.

use seinfeld_error::{PipelineError, PipelineErrorKind};
use serde::Serialize;
use std::str::FromStr;

/// A validated, non-empty episode theme.
///
/// Surrounding whitespace is trimmed. Once constructed a theme is never
/// mutated.
///
/// # Examples
///
/// ```
/// use seinfeld_core::Theme;
///
/// let theme = Theme::new("  Jerry's smart speaker mishears everything ").unwrap();
/// assert_eq!(theme.as_str(), "Jerry's smart speaker mishears everything");
/// assert!(Theme::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub struct Theme(String);

impl Theme {
    /// Validate and wrap a theme.
    ///
    /// # Errors
    ///
    /// Returns `InputInvalid` when the theme is empty after trimming.
    pub fn new(theme: impl AsRef<str>) -> Result<Self, PipelineError> {
        let trimmed = theme.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::InputInvalid(
                "theme must not be empty".to_string(),
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The theme text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Theme {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Theme {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
