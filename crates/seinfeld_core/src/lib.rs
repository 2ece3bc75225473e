//! Core data types for the Seinfeld script generator.
//!
//! This crate holds the value types shared by every other crate in the
//! workspace: chat messages and generation requests, the validated episode
//! [`Theme`], the retrieval query/result types, the layered
//! [`SeinfeldConfig`], and logging setup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod logging;
mod message;
mod request;
mod retrieval;
mod role;
mod theme;

pub use config::{
    EmbeddingConfig, GenerationConfig, RetrievalConfig, RetrievalNamespace, SeinfeldConfig,
};
pub use logging::init_logging;
pub use message::Message;
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, Usage};
pub use retrieval::{
    DEFAULT_QUERY, DEFAULT_RESULT_COUNT, DegradedReason, EpisodeMetadata, MAX_RENDERED_DIALOGUE,
    MAX_RESULT_COUNT, MIN_RESULT_COUNT, RetrievalMatch, RetrievalOutcome, RetrievalQuery,
};
pub use role::Role;
pub use theme::Theme;
