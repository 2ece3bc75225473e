//! Trait definitions and execution records for the Seinfeld script generator.
//!
//! The traits here are the seams between the pipeline and its backends:
//! a [`CompletionDriver`] produces text, [`Embeddings`] turns text into
//! vectors, and a [`VectorIndex`] ranks stored dialogue against a vector.
//! The execution types record what a pipeline run did.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod execution;
mod traits;

pub use execution::{PipelineRun, RetrievalExchange, RunState, StageRef, StageResult};
pub use traits::{ALLOWED_FIELDS, CompletionDriver, Embeddings, VectorIndex};
