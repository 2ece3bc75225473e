//! Top-level error wrapper types.

use crate::{ConfigError, GenerationError, PipelineError, RetrievalError, StorageError};

/// Every error the workspace can produce.
///
/// # Examples
///
/// ```
/// use seinfeld_error::{SeinfeldError, ConfigError};
///
/// let config_err = ConfigError::new("Missing generation.api_key");
/// let err: SeinfeldError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum SeinfeldErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Text-generation backend error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Retrieval backend error
    #[from(RetrievalError)]
    Retrieval(RetrievalError),
    /// Stage plan or pipeline run error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Script artifact storage error
    #[from(StorageError)]
    Storage(StorageError),
}

/// Seinfeld error with kind discrimination.
///
/// # Examples
///
/// ```
/// use seinfeld_error::{SeinfeldResult, ConfigError};
///
/// fn might_fail() -> SeinfeldResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Seinfeld Error: {}", _0)]
pub struct SeinfeldError(Box<SeinfeldErrorKind>);

impl SeinfeldError {
    /// Create a new error from a kind.
    pub fn new(kind: SeinfeldErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SeinfeldErrorKind {
        &self.0
    }

    /// Name of the failing stage, if this error came out of a pipeline stage.
    pub fn stage_name(&self) -> Option<&str> {
        match self.kind() {
            SeinfeldErrorKind::Pipeline(e) => e.kind.stage_name(),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to SeinfeldErrorKind
impl<T> From<T> for SeinfeldError
where
    T: Into<SeinfeldErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Seinfeld operations.
pub type SeinfeldResult<T> = std::result::Result<T, SeinfeldError>;
