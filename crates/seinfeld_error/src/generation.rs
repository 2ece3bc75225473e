//! Text-generation backend error types.

/// Specific error conditions raised by a text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// A required credential or endpoint is absent
    #[display("Generation backend not configured: {} is missing", _0)]
    MissingConfiguration(String),
    /// Transport-level failure (connection refused, DNS, TLS, timeout)
    #[display("Generation request failed: {}", _0)]
    Http(String),
    /// The backend answered with a non-success status
    #[display("Generation API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or error message
        message: String,
    },
    /// The backend rejected the request with 429
    #[display("Generation backend rate limit exceeded")]
    RateLimit,
    /// The requested model does not exist on the backend
    #[display("Model not found: {}", _0)]
    ModelNotFound(String),
    /// The response body could not be decoded
    #[display("Failed to parse generation response: {}", _0)]
    ResponseParsing(String),
    /// The request could not be assembled
    #[display("Failed to build generation request: {}", _0)]
    RequestBuild(String),
    /// The backend returned no text at all
    #[display("Generation backend returned an empty response")]
    EmptyResponse,
}

/// Error type for text-generation backends.
///
/// # Examples
///
/// ```
/// use seinfeld_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::RateLimit);
/// assert!(format!("{}", err).contains("rate limit"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The specific error condition
    pub kind: GenerationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
