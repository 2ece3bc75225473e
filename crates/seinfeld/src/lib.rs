//! Seinfeld - retrieval-augmented script generation
//!
//! Generates a Seinfeld-style episode script from a one-line theme by running
//! a fixed plan of generation stages (theme analysis, plot structure,
//! character voices, scene writing, polish). Every stage pulls reference
//! dialogue from a vector index of real scripts before calling the model;
//! when the index is unreachable the stages get illustrative demo passages
//! instead and the run carries on.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seinfeld::{ScriptGenerator, SeinfeldConfig};
//!
//! #[tokio::main]
//! async fn main() -> seinfeld::SeinfeldResult<()> {
//!     let config = SeinfeldConfig::load()?;
//!     let generator = ScriptGenerator::from_config(&config).await?;
//!     let script = generator.generate("Jerry's smart speaker mishears everything").await?;
//!     println!("{}", script);
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - export tracing spans through OpenTelemetry (stdout exporter)
//!
//! # Architecture
//!
//! - `seinfeld_error` - Error types
//! - `seinfeld_core` - Core data types, configuration and logging
//! - `seinfeld_interface` - Backend traits and run records
//! - `seinfeld_models` - OpenAI-compatible chat and embedding clients
//! - `seinfeld_retrieval` - Retrieval tool, Couchbase and in-memory indexes
//! - `seinfeld_pipeline` - Stage plans, executor and `ScriptGenerator`
//!
//! This crate (`seinfeld`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;

pub use artifact::{
    DEFAULT_OUTPUT_PATH, PREVIEW_CHARS, preview, render_artifact, resolve_output_path,
    write_artifact,
};

pub use seinfeld_core::*;
pub use seinfeld_error::*;
pub use seinfeld_interface::*;
pub use seinfeld_models::*;
pub use seinfeld_pipeline::*;
pub use seinfeld_retrieval::*;

// OpenTelemetry integration
#[cfg(feature = "observability")]
pub mod observability;
