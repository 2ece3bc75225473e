//! Static stage configuration.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A retrieval query a stage issues before calling the backend.
///
/// `query` is a template and may use the same placeholders as the stage
/// instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RetrievalTemplate {
    /// Query text template
    query: String,
    /// Requested number of passages; clamped into range at query time
    #[serde(default)]
    result_count: Option<usize>,
    /// Restrict passages to one speaker
    #[serde(default)]
    character: Option<String>,
}

impl RetrievalTemplate {
    /// A query template with default count and no speaker filter.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            result_count: None,
            character: None,
        }
    }

    /// Set the requested number of passages.
    pub fn with_result_count(mut self, result_count: usize) -> Self {
        self.result_count = Some(result_count);
        self
    }

    /// Restrict passages to one speaker.
    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = Some(character.into());
        self
    }
}

/// Configuration for one generation stage.
///
/// # Example
///
/// ```
/// use seinfeld_pipeline::{RetrievalTemplate, StageSpec};
///
/// let spec = StageSpec::builder()
///     .name("analyze_theme")
///     .role("Theme Analyzer")
///     .role_description("You find the comedy in everyday annoyances.")
///     .instructions("Break down {{theme}} into comedic angles.")
///     .retrieval(vec![RetrievalTemplate::new("{{theme}}").with_result_count(3)])
///     .build()
///     .unwrap();
///
/// assert_eq!(spec.name(), "analyze_theme");
/// assert!(spec.output_destination().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct StageSpec {
    /// Unique stage name; other stages refer to its output as `{{name}}`
    name: String,
    /// Short role title
    #[builder(default)]
    #[serde(default)]
    role: String,
    /// What the role is trying to achieve
    #[builder(default)]
    #[serde(default)]
    goal: String,
    /// Persona text
    role_description: String,
    /// Instruction template
    instructions: String,
    /// Description of the expected deliverable
    #[builder(default)]
    #[serde(default)]
    expected_output: Option<String>,
    /// Earlier stages whose output this stage reads; all earlier stages when absent
    #[builder(default)]
    #[serde(default)]
    context: Option<Vec<String>>,
    /// Retrieval queries issued before generation
    #[builder(default)]
    #[serde(default)]
    retrieval: Vec<RetrievalTemplate>,
    /// Where the finished output is written; final stage only
    #[builder(default)]
    #[serde(default)]
    output_destination: Option<String>,
    /// Model override
    #[builder(default)]
    #[serde(default)]
    model: Option<String>,
    /// Temperature override
    #[builder(default)]
    #[serde(default)]
    temperature: Option<f32>,
    /// Completion budget override
    #[builder(default)]
    #[serde(default)]
    max_tokens: Option<u32>,
}

impl StageSpec {
    /// Start building a stage.
    pub fn builder() -> StageSpecBuilder {
        StageSpecBuilder::default()
    }
}
