//! Retrieval-augmented stage pipeline for the Seinfeld script generator.
//!
//! A [`StagePlan`] is an ordered list of [`StageSpec`]s loaded from TOML.
//! The [`PipelineExecutor`] runs it stage by stage: each stage resolves its
//! templates against the theme and earlier results, pulls reference
//! dialogue through the shared [`RetrievalTool`](seinfeld_retrieval::RetrievalTool),
//! and makes one generation call. [`ScriptGenerator`] wraps the executor
//! behind `generate(theme)`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod executor;
mod generator;
mod plan;
mod spec;
mod stage;
mod template;

pub use executor::PipelineExecutor;
pub use generator::ScriptGenerator;
pub use plan::{PlanMetadata, StagePlan};
pub use spec::{RetrievalTemplate, StageSpec, StageSpecBuilder};
pub use stage::GenerationStage;
pub use template::{PREVIOUS_PLACEHOLDER, THEME_PLACEHOLDER, resolve_template, template_references};
