//! Ordered, validated stage plans loaded from TOML.

use crate::template::{PREVIOUS_PLACEHOLDER, THEME_PLACEHOLDER, template_references};
use crate::StageSpec;
use derive_getters::Getters;
use seinfeld_error::{PipelineError, PipelineErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, instrument};

const DEFAULT_PLAN: &str = include_str!("../plans/seinfeld.toml");

/// Plan metadata from the `[plan]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct PlanMetadata {
    /// Plan identifier
    name: String,
    /// What the plan produces
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlPlan {
    plan: PlanMetadata,
    #[serde(default)]
    stages: Vec<StageSpec>,
}

/// The ordered list of stages a pipeline run executes.
///
/// Construction always validates, so a `StagePlan` value is known to be
/// runnable:
/// - at least one stage
/// - unique stage names, none shadowing `theme` or `previous`
/// - non-empty persona and instructions
/// - `context` entries and `{{name}}` placeholders name strictly earlier stages
/// - only the final stage sets `output_destination`
///
/// # Example TOML
///
/// ```toml
/// [plan]
/// name = "short"
/// description = "Two-stage sketch"
///
/// [[stages]]
/// name = "premise"
/// role_description = "You pitch sitcom premises."
/// instructions = "Pitch a premise about {{theme}}."
///
/// [[stages.retrieval]]
/// query = "{{theme}}"
/// result_count = 3
///
/// [[stages]]
/// name = "scene"
/// role_description = "You write sitcom scenes."
/// instructions = "Write the opening scene for: {{premise}}"
/// output_destination = "output/scene.md"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct StagePlan {
    /// Plan metadata
    metadata: PlanMetadata,
    /// Stages in execution order
    stages: Vec<StageSpec>,
}

impl StagePlan {
    /// Build and validate a plan.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn new(metadata: PlanMetadata, stages: Vec<StageSpec>) -> Result<Self, PipelineError> {
        let plan = Self { metadata, stages };
        plan.validate()?;
        Ok(plan)
    }

    /// Build a plan from a name and stages.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn from_stages(
        name: impl Into<String>,
        stages: Vec<StageSpec>,
    ) -> Result<Self, PipelineError> {
        Self::new(
            PlanMetadata {
                name: name.into(),
                description: String::new(),
            },
            stages,
        )
    }

    /// The bundled five-stage Seinfeld plan.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled plan itself is malformed.
    pub fn default_plan() -> Result<Self, PipelineError> {
        DEFAULT_PLAN.parse()
    }

    /// Load a plan from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is invalid,
    /// or validation fails.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PipelineError::new(PipelineErrorKind::FileRead(e.to_string())))?;
        content.parse()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false for a validated plan.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Where the final stage's output should be written, if anywhere.
    pub fn output_destination(&self) -> Option<&str> {
        self.stages
            .last()
            .and_then(|stage| stage.output_destination().as_deref())
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::EmptyPlan));
        }

        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (index, stage) in self.stages.iter().enumerate() {
            let name = stage.name().as_str();
            if name.trim().is_empty() {
                return Err(PipelineError::new(PipelineErrorKind::InputInvalid(format!(
                    "stage {} has an empty name",
                    index + 1
                ))));
            }
            if name == THEME_PLACEHOLDER || name == PREVIOUS_PLACEHOLDER {
                return Err(PipelineError::new(PipelineErrorKind::InputInvalid(format!(
                    "stage name '{}' is reserved",
                    name
                ))));
            }
            if positions.insert(name, index).is_some() {
                return Err(PipelineError::new(PipelineErrorKind::DuplicateStage(
                    name.to_string(),
                )));
            }
        }

        let last = self.stages.len() - 1;
        for (index, stage) in self.stages.iter().enumerate() {
            let name = stage.name();

            if stage.role_description().trim().is_empty() {
                return Err(PipelineError::new(PipelineErrorKind::EmptyPersona(
                    name.clone(),
                )));
            }
            if stage.instructions().trim().is_empty() {
                return Err(PipelineError::new(PipelineErrorKind::EmptyInstructions(
                    name.clone(),
                )));
            }
            if index != last && stage.output_destination().is_some() {
                return Err(PipelineError::new(
                    PipelineErrorKind::MisplacedOutputDestination(name.clone()),
                ));
            }

            let mut references: Vec<String> = stage.context().clone().unwrap_or_default();
            for template in std::iter::once(stage.instructions())
                .chain(stage.expected_output().iter())
                .chain(stage.retrieval().iter().map(|r| r.query()))
            {
                references.extend(
                    template_references(template)?
                        .into_iter()
                        .filter(|r| r != THEME_PLACEHOLDER),
                );
            }

            for reference in references {
                if reference == PREVIOUS_PLACEHOLDER {
                    if index == 0 {
                        return Err(PipelineError::new(PipelineErrorKind::ForwardReference {
                            stage: name.clone(),
                            reference,
                        }));
                    }
                    continue;
                }
                match positions.get(reference.as_str()) {
                    None => {
                        return Err(PipelineError::new(PipelineErrorKind::UnknownReference {
                            stage: name.clone(),
                            reference,
                        }));
                    }
                    Some(&position) if position >= index => {
                        return Err(PipelineError::new(PipelineErrorKind::ForwardReference {
                            stage: name.clone(),
                            reference,
                        }));
                    }
                    Some(_) => {}
                }
            }
        }

        debug!(plan = %self.metadata.name, stages = self.stages.len(), "Stage plan validated");
        Ok(())
    }
}

impl FromStr for StagePlan {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed: TomlPlan = toml::from_str(s)
            .map_err(|e| PipelineError::new(PipelineErrorKind::TomlParse(e.to_string())))?;
        Self::new(parsed.plan, parsed.stages)
    }
}
