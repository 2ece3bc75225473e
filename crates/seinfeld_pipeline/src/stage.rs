//! One retrieval-augmented generation step.

use crate::template::{PREVIOUS_PLACEHOLDER, resolve_template, template_references};
use crate::StageSpec;
use seinfeld_core::{GenerateRequest, Message, RetrievalQuery, Theme};
use seinfeld_error::{
    GenerationError, GenerationErrorKind, PipelineError, PipelineErrorKind, SeinfeldResult,
};
use seinfeld_interface::{CompletionDriver, RetrievalExchange, StageResult};
use seinfeld_retrieval::RetrievalTool;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// A configured stage ready to run at a fixed position in a plan.
#[derive(Debug, Clone)]
pub struct GenerationStage<'a> {
    spec: &'a StageSpec,
    sequence_number: usize,
}

impl<'a> GenerationStage<'a> {
    /// Bind a stage spec to its 0-indexed position.
    pub fn new(spec: &'a StageSpec, sequence_number: usize) -> Self {
        Self {
            spec,
            sequence_number,
        }
    }

    /// The stage configuration.
    pub fn spec(&self) -> &StageSpec {
        self.spec
    }

    /// Run the stage.
    ///
    /// `prior` holds the results of every earlier stage in execution order.
    /// Issues each configured retrieval query through `retrieval`, then makes
    /// exactly one call to `driver`.
    ///
    /// # Errors
    ///
    /// Fails on an unresolvable placeholder, a backend error, or a response
    /// that is empty or whitespace only.
    #[instrument(
        skip(self, driver, theme, prior, retrieval),
        fields(stage = %self.spec.name(), sequence = self.sequence_number)
    )]
    pub async fn run<D: CompletionDriver + ?Sized>(
        &self,
        driver: &D,
        theme: &Theme,
        prior: &[StageResult],
        retrieval: &RetrievalTool,
        default_result_count: usize,
    ) -> SeinfeldResult<StageResult> {
        let instructions = resolve_template(self.spec.instructions(), theme, prior)?;
        let expected_output = self
            .spec
            .expected_output()
            .as_deref()
            .map(|text| resolve_template(text, theme, prior))
            .transpose()?;

        let mut retrievals = Vec::with_capacity(self.spec.retrieval().len());
        for template in self.spec.retrieval() {
            let text = resolve_template(template.query(), theme, prior)?;
            let mut query =
                RetrievalQuery::new(text, template.result_count().unwrap_or(default_result_count));
            if let Some(character) = template.character() {
                query = query.with_character(character.as_str());
            }
            let outcome = retrieval.search(&query).await;
            debug!(
                query = query.query_text(),
                passages = outcome.len(),
                degraded = outcome.is_degraded(),
                "Retrieved reference material"
            );
            retrievals.push(RetrievalExchange { query, outcome });
        }

        let sources = self.readable_sources(prior)?;

        let request = GenerateRequest::builder()
            .messages(vec![
                Message::system(self.system_prompt()),
                Message::user(self.user_prompt(
                    theme,
                    &instructions,
                    expected_output.as_deref(),
                    &sources,
                    &retrievals,
                )),
            ])
            .model(self.spec.model().clone())
            .temperature(*self.spec.temperature())
            .max_tokens(*self.spec.max_tokens())
            .build()
            .map_err(|e| {
                GenerationError::new(GenerationErrorKind::RequestBuild(e.to_string()))
            })?;

        let response = driver.generate(&request).await?;
        if response.text.trim().is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::EmptyResponse).into());
        }

        let model = response
            .model
            .or_else(|| self.spec.model().clone())
            .or_else(|| Some(driver.model_name().to_string()));

        debug!(chars = response.text.len(), "Stage produced output");
        Ok(StageResult::new(
            self.spec.name().clone(),
            self.sequence_number,
            response.text,
            sources.iter().map(|r| r.stage_ref()).collect(),
            retrievals,
            model,
        ))
    }

    /// Earlier results this stage reads: its `context` list (or every
    /// earlier stage when unset) plus anything its templates name, in
    /// execution order.
    fn readable_sources<'r>(
        &self,
        prior: &'r [StageResult],
    ) -> Result<Vec<&'r StageResult>, PipelineError> {
        let mut names: HashSet<String> = match self.spec.context() {
            Some(context) => context.iter().cloned().collect(),
            None => prior.iter().map(|r| r.stage_name().clone()).collect(),
        };

        let mut templates = vec![self.spec.instructions().as_str()];
        if let Some(expected) = self.spec.expected_output() {
            templates.push(expected);
        }
        for template in templates {
            for reference in template_references(template)? {
                if reference == PREVIOUS_PLACEHOLDER {
                    if let Some(last) = prior.last() {
                        names.insert(last.stage_name().clone());
                    }
                } else {
                    names.insert(reference);
                }
            }
        }

        let sources: Vec<&StageResult> = prior
            .iter()
            .filter(|r| names.contains(r.stage_name().as_str()))
            .collect();

        if let Some(missing) = self
            .spec
            .context()
            .iter()
            .flatten()
            .find(|name| !prior.iter().any(|r| r.stage_name() == *name))
        {
            return Err(PipelineError::new(PipelineErrorKind::Template(format!(
                "Context stage '{}' has no result yet",
                missing
            ))));
        }

        Ok(sources)
    }

    fn system_prompt(&self) -> String {
        let mut prompt = String::new();
        if !self.spec.role().trim().is_empty() {
            prompt.push_str(&format!("You are the {}.\n", self.spec.role().trim()));
        }
        if !self.spec.goal().trim().is_empty() {
            prompt.push_str(&format!("Your goal: {}\n", self.spec.goal().trim()));
        }
        if !prompt.is_empty() {
            prompt.push('\n');
        }
        prompt.push_str(self.spec.role_description().trim());
        prompt
    }

    fn user_prompt(
        &self,
        theme: &Theme,
        instructions: &str,
        expected_output: Option<&str>,
        sources: &[&StageResult],
        retrievals: &[RetrievalExchange],
    ) -> String {
        let mut prompt = format!("# Episode theme\n\n{}\n\n", theme);
        prompt.push_str(&format!("# Task\n\n{}\n\n", instructions.trim()));

        if let Some(expected) = expected_output {
            prompt.push_str(&format!("# Expected output\n\n{}\n\n", expected.trim()));
        }

        if !sources.is_empty() {
            prompt.push_str("# Earlier work\n\n");
            for source in sources {
                prompt.push_str(&format!(
                    "## {}\n\n{}\n\n",
                    source.stage_name(),
                    source.content().trim()
                ));
            }
        }

        if !retrievals.is_empty() {
            prompt.push_str("# Reference dialogue\n\n");
            for exchange in retrievals {
                prompt.push_str(&exchange.outcome.to_markdown(&exchange.query));
                prompt.push('\n');
            }
        }

        prompt
    }
}
