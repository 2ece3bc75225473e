//! Pipeline execution logic.
//!
//! The executor runs a [`StagePlan`] strictly in order, handing every stage
//! the results of all earlier stages and the single shared retrieval tool.

use crate::{GenerationStage, StagePlan};
use seinfeld_core::{DEFAULT_RESULT_COUNT, Theme};
use seinfeld_error::{SeinfeldError, SeinfeldErrorKind};
use seinfeld_interface::{CompletionDriver, PipelineRun};
use seinfeld_retrieval::RetrievalTool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Executes stage plans against one generation driver.
///
/// There are no retries: the first failing stage ends the run, and no
/// partial script is produced.
#[derive(Debug)]
pub struct PipelineExecutor<D: CompletionDriver> {
    driver: D,
    retrieval: Arc<RetrievalTool>,
    default_result_count: usize,
}

impl<D: CompletionDriver> PipelineExecutor<D> {
    /// Create an executor.
    pub fn new(driver: D, retrieval: Arc<RetrievalTool>) -> Self {
        Self {
            driver,
            retrieval,
            default_result_count: DEFAULT_RESULT_COUNT,
        }
    }

    /// Result count used by retrieval queries that do not set one.
    pub fn with_default_result_count(mut self, count: usize) -> Self {
        self.default_result_count = count;
        self
    }

    /// The generation driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The shared retrieval tool.
    pub fn retrieval(&self) -> &Arc<RetrievalTool> {
        &self.retrieval
    }

    /// Run every stage of `plan` for `theme`.
    ///
    /// Never returns an error directly: the returned run's state is
    /// `Completed`, `Failed` (1-based stage number, name, cause) or
    /// `Cancelled`. Cancellation is checked before each stage starts.
    #[tracing::instrument(
        skip(self, theme, plan, cancel),
        fields(plan = %plan.metadata().name(), stages = plan.len(), provider = self.driver.provider_name())
    )]
    pub async fn execute(
        &self,
        theme: &Theme,
        plan: &StagePlan,
        cancel: &CancellationToken,
    ) -> PipelineRun {
        let mut run = PipelineRun::new(theme.clone());

        for (sequence_number, spec) in plan.stages().iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(
                    completed = run.stage_results().len(),
                    "Pipeline cancelled before stage {}",
                    sequence_number + 1
                );
                run.cancel();
                return run;
            }

            run.begin_stage(sequence_number);
            tracing::info!(
                stage = %spec.name(),
                role = %spec.role(),
                "Running stage {}/{}",
                sequence_number + 1,
                plan.len()
            );

            let stage = GenerationStage::new(spec, sequence_number);
            let outcome = stage
                .run(
                    &self.driver,
                    theme,
                    run.stage_results(),
                    &self.retrieval,
                    self.default_result_count,
                )
                .await;

            match outcome {
                Ok(result) => {
                    tracing::debug!(
                        stage = %spec.name(),
                        chars = result.content().len(),
                        sources = result.source_stage_results().len(),
                        "Stage completed"
                    );
                    run.record(result);
                }
                Err(e) => {
                    let cause = failure_cause(&e);
                    tracing::error!(
                        stage = %spec.name(),
                        stage_number = sequence_number + 1,
                        error = %cause,
                        "Stage failed; halting pipeline"
                    );
                    run.fail(sequence_number, spec.name().clone(), cause);
                    return run;
                }
            }
        }

        run.complete();
        tracing::info!(stages = run.stage_results().len(), "Pipeline completed");
        run
    }
}

/// Human-readable cause without the location suffix of the wrapper types.
fn failure_cause(error: &SeinfeldError) -> String {
    match error.kind() {
        SeinfeldErrorKind::Generation(e) => e.kind.to_string(),
        SeinfeldErrorKind::Pipeline(e) => e.kind.to_string(),
        SeinfeldErrorKind::Retrieval(e) => e.kind.to_string(),
        other => other.to_string(),
    }
}
