//! Execution records for pipeline runs.
//!
//! These types are produced by the pipeline executor and are plain data:
//! a [`StageResult`] is never modified after it is recorded, and a
//! [`PipelineRun`] only moves forward through its [`RunState`].

use derive_getters::Getters;
use seinfeld_core::{RetrievalOutcome, RetrievalQuery, Theme};
use seinfeld_error::{PipelineError, PipelineErrorKind, SeinfeldResult};
use serde::Serialize;

/// Reference to an earlier stage's result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StageRef {
    /// Position of the referenced stage (0-indexed)
    pub sequence_number: usize,
    /// Name of the referenced stage
    pub stage_name: String,
}

/// One retrieval call a stage made, with what came back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalExchange {
    /// The normalized query as sent
    pub query: RetrievalQuery,
    /// Matches or the degraded fallback
    pub outcome: RetrievalOutcome,
}

/// The output of one executed stage.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct StageResult {
    /// Name of the stage that produced this result
    stage_name: String,
    /// Position in the execution sequence (0-indexed)
    sequence_number: usize,
    /// Text produced by the generation backend, unmodified
    content: String,
    /// Earlier results this stage was allowed to read, in execution order
    source_stage_results: Vec<StageRef>,
    /// Retrieval calls issued while preparing the prompt
    retrievals: Vec<RetrievalExchange>,
    /// Model that answered
    model: Option<String>,
}

impl StageResult {
    /// Record a finished stage.
    pub fn new(
        stage_name: impl Into<String>,
        sequence_number: usize,
        content: impl Into<String>,
        source_stage_results: Vec<StageRef>,
        retrievals: Vec<RetrievalExchange>,
        model: Option<String>,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            sequence_number,
            content: content.into(),
            source_stage_results,
            retrievals,
            model,
        }
    }

    /// A reference to this result for use by later stages.
    pub fn stage_ref(&self) -> StageRef {
        StageRef {
            sequence_number: self.sequence_number,
            stage_name: self.stage_name.clone(),
        }
    }
}

/// Where a pipeline run is in its lifecycle.
///
/// Stage numbers here are 1-based, matching how runs are reported to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum RunState {
    /// Created, nothing executed
    #[display("not started")]
    NotStarted,
    /// Executing the given stage
    #[display("running stage {}", stage_number)]
    Running {
        /// 1-based stage number
        stage_number: usize,
    },
    /// Every stage finished
    #[display("completed")]
    Completed,
    /// A stage failed and the run halted
    #[display("failed at stage {} ('{}'): {}", stage_number, stage_name, cause)]
    Failed {
        /// 1-based stage number
        stage_number: usize,
        /// Name of the failing stage
        stage_name: String,
        /// Human-readable cause
        cause: String,
    },
    /// Cancelled between stages
    #[display("cancelled after {} stage(s)", completed_stages)]
    Cancelled {
        /// Number of stages that finished before cancellation
        completed_stages: usize,
    },
}

impl RunState {
    /// Whether the run can make no further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}

/// A full pipeline run: the theme, every stage result in order, and the
/// final script when the run completed.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct PipelineRun {
    /// The theme driving the run
    theme: Theme,
    /// Current lifecycle state
    state: RunState,
    /// Results in execution order
    stage_results: Vec<StageResult>,
    /// The final stage's content, set only on completion
    output: Option<String>,
}

impl PipelineRun {
    /// A run that has not executed anything.
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            state: RunState::NotStarted,
            stage_results: Vec::new(),
            output: None,
        }
    }

    /// Mark the given 0-indexed stage as executing.
    pub fn begin_stage(&mut self, sequence_number: usize) {
        self.state = RunState::Running {
            stage_number: sequence_number + 1,
        };
    }

    /// Append a finished stage.
    pub fn record(&mut self, result: StageResult) {
        self.stage_results.push(result);
    }

    /// Finish successfully; the output is the last recorded result.
    pub fn complete(&mut self) {
        self.output = self.stage_results.last().map(|r| r.content.clone());
        self.state = RunState::Completed;
    }

    /// Halt on a failed stage (0-indexed).
    pub fn fail(&mut self, sequence_number: usize, stage_name: impl Into<String>, cause: impl Into<String>) {
        self.output = None;
        self.state = RunState::Failed {
            stage_number: sequence_number + 1,
            stage_name: stage_name.into(),
            cause: cause.into(),
        };
    }

    /// Halt because cancellation was requested.
    pub fn cancel(&mut self) {
        self.output = None;
        self.state = RunState::Cancelled {
            completed_stages: self.stage_results.len(),
        };
    }

    /// Whether the run finished every stage.
    pub fn is_completed(&self) -> bool {
        self.state == RunState::Completed
    }

    /// Convert the run into its script, or the error that stopped it.
    ///
    /// # Errors
    ///
    /// Returns `StageFailed` for failed runs and `Cancelled` for cancelled
    /// or unfinished ones.
    pub fn into_output(self) -> SeinfeldResult<String> {
        match self.state {
            RunState::Completed => self.output.ok_or_else(|| {
                PipelineError::new(PipelineErrorKind::Cancelled {
                    completed_stages: 0,
                })
                .into()
            }),
            RunState::Failed {
                stage_number,
                stage_name,
                cause,
            } => Err(PipelineError::new(PipelineErrorKind::StageFailed {
                stage_number,
                stage_name,
                cause,
            })
            .into()),
            RunState::Cancelled { completed_stages } => {
                Err(PipelineError::new(PipelineErrorKind::Cancelled { completed_stages }).into())
            }
            RunState::NotStarted | RunState::Running { .. } => {
                Err(PipelineError::new(PipelineErrorKind::Cancelled {
                    completed_stages: self.stage_results.len(),
                })
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme() -> Theme {
        Theme::new("The parking space").unwrap()
    }

    fn result(name: &str, seq: usize) -> StageResult {
        StageResult::new(name, seq, format!("{} output", name), vec![], vec![], None)
    }

    #[test]
    fn test_completed_run_outputs_final_stage() {
        let mut run = PipelineRun::new(theme());
        run.begin_stage(0);
        run.record(result("analyze", 0));
        run.begin_stage(1);
        run.record(result("review", 1));
        run.complete();

        assert!(run.state().is_terminal());
        assert_eq!(run.output().as_deref(), Some("review output"));
        assert_eq!(run.into_output().unwrap(), "review output");
    }

    #[test]
    fn test_failed_run_names_stage() {
        let mut run = PipelineRun::new(theme());
        run.begin_stage(0);
        run.record(result("analyze", 0));
        run.begin_stage(1);
        run.fail(1, "plot", "backend exploded");

        assert_eq!(
            run.state(),
            &RunState::Failed {
                stage_number: 2,
                stage_name: "plot".to_string(),
                cause: "backend exploded".to_string(),
            }
        );
        assert!(run.output().is_none());

        let err = run.into_output().unwrap_err();
        assert_eq!(err.stage_name(), Some("plot"));
        assert!(err.to_string().contains("Stage 2"));
    }

    #[test]
    fn test_run_serializes() {
        let mut run = PipelineRun::new(theme());
        run.cancel();
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["theme"], "The parking space");
        assert_eq!(json["state"]["Cancelled"]["completed_stages"], 0);
    }
}
