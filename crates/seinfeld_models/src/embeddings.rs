//! Embeddings client.

use crate::dto::{EmbeddingRequest, EmbeddingResponse, error_message};
use crate::{join_url, normalize_model_name};
use async_trait::async_trait;
use reqwest::Client;
use seinfeld_core::EmbeddingConfig;
use seinfeld_error::{RetrievalError, RetrievalErrorKind};
use seinfeld_interface::Embeddings;
use std::time::Duration;
use tracing::{debug, instrument};

/// Embedding provider for any OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleEmbeddings {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAICompatibleEmbeddings {
    /// Create a provider with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                RetrievalError::new(RetrievalErrorKind::ConnectionFailure(format!(
                    "Failed to initialize HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: normalize_model_name(&model.into()).to_string(),
            endpoint: endpoint.into(),
        })
    }

    /// Create a provider from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationMissing` naming every absent setting.
    #[instrument(skip(config))]
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, RetrievalError> {
        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(RetrievalError::new(RetrievalErrorKind::ConfigurationMissing(
                missing.join(", "),
            )));
        }

        Self::new(
            config.api_key().clone().unwrap_or_default(),
            config.model().clone().unwrap_or_default(),
            config.endpoint().clone().unwrap_or_default(),
        )
    }
}

#[async_trait]
impl Embeddings for OpenAICompatibleEmbeddings {
    #[instrument(skip(self, inputs), fields(model = %self.model, count = inputs.len()))]
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let url = join_url(&self.endpoint, "embeddings");
        debug!(url = %url, "Requesting embeddings");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: inputs,
            })
            .send()
            .await
            .map_err(|e| {
                RetrievalError::new(RetrievalErrorKind::ConnectionFailure(format!(
                    "Embedding request failed: {}",
                    e
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RetrievalError::new(RetrievalErrorKind::Embedding(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_message(&text)
            ))));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            RetrievalError::new(RetrievalErrorKind::Embedding(format!(
                "Failed to parse embedding response: {}",
                e
            )))
        })?;

        if parsed.data.len() != inputs.len() {
            return Err(RetrievalError::new(RetrievalErrorKind::Embedding(format!(
                "Expected {} vectors, received {}",
                inputs.len(),
                parsed.data.len()
            ))));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
