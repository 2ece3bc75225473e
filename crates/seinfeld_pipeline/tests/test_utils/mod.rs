//! Shared helpers for pipeline integration tests.

#![allow(dead_code)]

pub mod mock_driver;

pub use mock_driver::{MockBehavior, MockDriver, MockResponse};

use seinfeld_core::DegradedReason;
use seinfeld_pipeline::{RetrievalTemplate, StagePlan, StageSpec};
use seinfeld_retrieval::RetrievalTool;
use std::sync::Arc;

/// A retrieval tool that cannot reach any backend.
pub fn unreachable_retrieval() -> Arc<RetrievalTool> {
    Arc::new(RetrievalTool::degraded(DegradedReason::Unavailable(
        "connection refused".to_string(),
    )))
}

/// A stage that reads every earlier stage and asks for reference dialogue about the theme.
pub fn stage(name: &str) -> StageSpec {
    StageSpec::builder()
        .name(name)
        .role("Writer")
        .role_description(format!("You write the {} part.", name))
        .instructions(format!("Work on {{{{theme}}}} for {}.", name))
        .retrieval(vec![RetrievalTemplate::new("{{theme}}").with_result_count(2)])
        .build()
        .unwrap()
}

/// A plan of simple stages named `stage_1..=stage_n`.
pub fn linear_plan(n: usize) -> StagePlan {
    let stages = (1..=n).map(|i| stage(&format!("stage_{}", i))).collect();
    StagePlan::from_stages("linear", stages).unwrap()
}
