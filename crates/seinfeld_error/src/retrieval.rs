//! Retrieval error types.
//!
//! These never reach a generation stage: the retrieval tool absorbs them and
//! answers with its degraded-mode passages instead. They exist so the reason
//! for degradation can be logged and inspected.

/// Specific error conditions for the retrieval backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RetrievalErrorKind {
    /// A required credential, endpoint or namespace entry is absent
    #[display("Retrieval backend not configured: {} is missing", _0)]
    ConfigurationMissing(String),
    /// The backend could not be reached or refused the credentials at setup
    #[display("Retrieval backend unreachable: {}", _0)]
    ConnectionFailure(String),
    /// A single similarity search failed at request time
    #[display("Retrieval query failed: {}", _0)]
    QueryFailure(String),
    /// The embedding provider failed to embed the query
    #[display("Embedding failed: {}", _0)]
    Embedding(String),
    /// Query vector and indexed vectors disagree on dimensionality
    #[display("Embedding dimension mismatch: expected {}, got {}", expected, actual)]
    DimensionMismatch {
        /// Dimensionality of the indexed vectors
        expected: usize,
        /// Dimensionality of the query vector
        actual: usize,
    },
    /// A reference corpus file could not be read or parsed
    #[display("Failed to load reference corpus: {}", _0)]
    CorpusLoad(String),
}

/// Error type for retrieval operations.
///
/// # Examples
///
/// ```
/// use seinfeld_error::{RetrievalError, RetrievalErrorKind};
///
/// let err = RetrievalError::new(RetrievalErrorKind::ConfigurationMissing("CB_BUCKET".into()));
/// assert!(format!("{}", err).contains("CB_BUCKET"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Retrieval Error: {} at line {} in {}", kind, line, file)]
pub struct RetrievalError {
    /// The specific error condition
    pub kind: RetrievalErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl RetrievalError {
    /// Create a new RetrievalError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RetrievalErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
