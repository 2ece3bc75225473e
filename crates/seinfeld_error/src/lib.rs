//! Error types for the Seinfeld script generator.
//!
//! Every error follows the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines the specific condition
//! - `*Error` struct wraps the kind and records where it was raised
//! - constructors use `#[track_caller]` to capture the location
//!
//! # Examples
//!
//! ```
//! use seinfeld_error::{SeinfeldResult, ConfigError};
//!
//! fn load_model() -> SeinfeldResult<String> {
//!     Err(ConfigError::new("Missing generation.model"))?
//! }
//!
//! match load_model() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generation;
mod pipeline;
mod retrieval;
mod storage;

pub use config::ConfigError;
pub use error::{SeinfeldError, SeinfeldErrorKind, SeinfeldResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use retrieval::{RetrievalError, RetrievalErrorKind};
pub use storage::{StorageError, StorageErrorKind};
