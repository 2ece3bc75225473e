//! Request-level entry point: theme in, script out.

use crate::{PipelineExecutor, StagePlan};
use seinfeld_core::{SeinfeldConfig, Theme};
use seinfeld_error::SeinfeldResult;
use seinfeld_interface::{CompletionDriver, PipelineRun};
use seinfeld_models::OpenAICompatibleClient;
use seinfeld_retrieval::RetrievalTool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Generates scripts by running a fixed stage plan.
///
/// # Example
///
/// ```rust,ignore
/// use seinfeld_core::SeinfeldConfig;
/// use seinfeld_pipeline::ScriptGenerator;
///
/// let config = SeinfeldConfig::load()?;
/// let generator = ScriptGenerator::from_config(&config).await?;
/// let script = generator.generate("Jerry's smart speaker mishears everything").await?;
/// ```
#[derive(Debug)]
pub struct ScriptGenerator<D: CompletionDriver> {
    executor: PipelineExecutor<D>,
    plan: StagePlan,
}

impl<D: CompletionDriver> ScriptGenerator<D> {
    /// Create a generator from its parts.
    pub fn new(driver: D, retrieval: Arc<RetrievalTool>, plan: StagePlan) -> Self {
        Self {
            executor: PipelineExecutor::new(driver, retrieval),
            plan,
        }
    }

    /// Create a generator from a prepared executor.
    pub fn with_executor(executor: PipelineExecutor<D>, plan: StagePlan) -> Self {
        Self { executor, plan }
    }

    /// The stage plan every request runs.
    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    /// The shared retrieval tool.
    pub fn retrieval(&self) -> &Arc<RetrievalTool> {
        self.executor.retrieval()
    }

    /// Generate a script for `theme`.
    ///
    /// # Errors
    ///
    /// Returns `InputInvalid` for an empty theme before any stage runs, and
    /// `StageFailed` naming the stage when a stage fails.
    pub async fn generate(&self, theme: &str) -> SeinfeldResult<String> {
        self.generate_run(theme, &CancellationToken::new())
            .await?
            .into_output()
    }

    /// Generate a script and return the full run record.
    ///
    /// The run itself reports stage failure and cancellation through its
    /// state; only an invalid theme is returned as an error.
    ///
    /// # Errors
    ///
    /// Returns `InputInvalid` for an empty or whitespace-only theme.
    #[instrument(skip(self, cancel), fields(plan = %self.plan.metadata().name()))]
    pub async fn generate_run(
        &self,
        theme: &str,
        cancel: &CancellationToken,
    ) -> SeinfeldResult<PipelineRun> {
        let theme = Theme::new(theme)?;
        Ok(self.executor.execute(&theme, &self.plan, cancel).await)
    }
}

impl ScriptGenerator<OpenAICompatibleClient> {
    /// Wire the generator from configuration with the bundled plan.
    ///
    /// Retrieval problems are absorbed into a degraded retrieval tool.
    ///
    /// # Errors
    ///
    /// Fails when the generation backend is not configured.
    pub async fn from_config(config: &SeinfeldConfig) -> SeinfeldResult<Self> {
        Self::from_config_with_plan(config, StagePlan::default_plan()?).await
    }

    /// Wire the generator from configuration with a custom plan.
    ///
    /// # Errors
    ///
    /// Fails when the generation backend is not configured.
    #[instrument(skip_all, fields(plan = %plan.metadata().name()))]
    pub async fn from_config_with_plan(
        config: &SeinfeldConfig,
        plan: StagePlan,
    ) -> SeinfeldResult<Self> {
        let driver = OpenAICompatibleClient::from_config(config.generation())?;
        let retrieval = Arc::new(RetrievalTool::connect(config).await);
        let executor = PipelineExecutor::new(driver, retrieval)
            .with_default_result_count(*config.retrieval().default_result_count());
        Ok(Self::with_executor(executor, plan))
    }
}
