//! Storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create the output directory
    #[display("Failed to create directory {}: {}", path, reason)]
    DirectoryCreation {
        /// Directory that could not be created
        path: String,
        /// Underlying I/O failure
        reason: String,
    },
    /// Failed to write a file
    #[display("Failed to write file {}: {}", path, reason)]
    FileWrite {
        /// File that could not be written
        path: String,
        /// Underlying I/O failure
        reason: String,
    },
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use seinfeld_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::FileWrite {
///     path: "output/seinfeld_script.md".to_string(),
///     reason: "read-only file system".to_string(),
/// });
/// assert!(format!("{}", err).contains("Storage Error"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
