//! Pipeline error types.

/// Specific error conditions for stage plans and pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// The theme is empty or whitespace
    #[display("Input invalid: {}", _0)]
    InputInvalid(String),
    /// Failed to read a stage plan file
    #[display("Failed to read stage plan: {}", _0)]
    FileRead(String),
    /// Failed to parse stage plan TOML
    #[display("Failed to parse stage plan TOML: {}", _0)]
    TomlParse(String),
    /// The plan has no stages
    #[display("Stage plan must contain at least one stage")]
    EmptyPlan,
    /// Two stages share a name
    #[display("Stage '{}' is defined more than once", _0)]
    DuplicateStage(String),
    /// Stage persona is empty or whitespace
    #[display("Stage '{}' has an empty role description", _0)]
    EmptyPersona(String),
    /// Stage instructions are empty or whitespace
    #[display("Stage '{}' has empty instructions", _0)]
    EmptyInstructions(String),
    /// A stage references a stage that does not exist
    #[display("Stage '{}' references unknown stage '{}'", stage, reference)]
    UnknownReference {
        /// Stage holding the reference
        stage: String,
        /// Referenced name
        reference: String,
    },
    /// A stage references itself or a stage that runs after it
    #[display("Stage '{}' references '{}', which has not run yet", stage, reference)]
    ForwardReference {
        /// Stage holding the reference
        stage: String,
        /// Referenced name
        reference: String,
    },
    /// Only the final stage may persist its output
    #[display("Stage '{}' sets output_destination but is not the final stage", _0)]
    MisplacedOutputDestination(String),
    /// Template placeholder could not be resolved
    #[display("Template error: {}", _0)]
    Template(String),
    /// A stage could not produce output; the run halted
    #[display("Stage {} ('{}') failed: {}", stage_number, stage_name, cause)]
    StageFailed {
        /// 1-based position of the failing stage
        stage_number: usize,
        /// Name of the failing stage
        stage_name: String,
        /// Human-readable cause
        cause: String,
    },
    /// The run was cancelled at a stage boundary
    #[display("Pipeline cancelled after {} completed stage(s)", completed_stages)]
    Cancelled {
        /// Number of stages that finished before cancellation
        completed_stages: usize,
    },
}

impl PipelineErrorKind {
    /// Name of the stage this error concerns, when it concerns one.
    pub fn stage_name(&self) -> Option<&str> {
        match self {
            Self::DuplicateStage(name)
            | Self::EmptyPersona(name)
            | Self::EmptyInstructions(name)
            | Self::MisplacedOutputDestination(name) => Some(name),
            Self::UnknownReference { stage, .. } | Self::ForwardReference { stage, .. } => {
                Some(stage)
            }
            Self::StageFailed { stage_name, .. } => Some(stage_name),
            _ => None,
        }
    }
}

/// Error type for pipeline operations.
///
/// # Examples
///
/// ```
/// use seinfeld_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::StageFailed {
///     stage_number: 3,
///     stage_name: "develop_character_voices".into(),
///     cause: "backend unavailable".into(),
/// });
/// assert_eq!(err.kind.stage_name(), Some("develop_character_voices"));
/// assert!(format!("{}", err).contains("Stage 3"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
