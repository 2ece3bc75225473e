//! Chat-completions client.

use crate::dto::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, error_message};
use crate::{DEFAULT_ENDPOINT, join_url, normalize_model_name};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use seinfeld_core::{GenerateRequest, GenerateResponse, GenerationConfig, Usage};
use seinfeld_error::{GenerationError, GenerationErrorKind};
use seinfeld_interface::CompletionDriver;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Text-generation client for any OpenAI-compatible chat endpoint.
///
/// One HTTP call per [`generate`](CompletionDriver::generate); no retries.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAICompatibleClient {
    /// Create a client with explicit settings and default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    #[instrument(skip_all)]
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let client = build_http_client(120)?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: normalize_model_name(&model.into()).to_string(),
            endpoint: endpoint.into(),
            temperature: None,
            max_tokens: None,
        })
    }

    /// Create a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `MissingConfiguration` naming the first absent setting, or an
    /// HTTP error if the client cannot be initialized.
    #[instrument(skip(config))]
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let model = required(config.model(), "generation.model (LLM_MODEL_NAME)")?;
        let api_key = required(config.api_key(), "generation.api_key (LLM_API_KEY)")?;
        let endpoint = config
            .endpoint()
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string();

        debug!(model, endpoint = %endpoint, "Configuring generation client");

        Ok(Self {
            client: build_http_client(*config.request_timeout_secs())?,
            api_key: api_key.to_string(),
            model: normalize_model_name(model).to_string(),
            endpoint,
            temperature: *config.temperature(),
            max_tokens: *config.max_tokens(),
        })
    }

    fn completions_url(&self) -> String {
        join_url(&self.endpoint, "chat/completions")
    }

    fn error_for_status(status: StatusCode, body: &str, model: &str) -> GenerationError {
        let kind = match status {
            StatusCode::TOO_MANY_REQUESTS => GenerationErrorKind::RateLimit,
            StatusCode::NOT_FOUND => GenerationErrorKind::ModelNotFound(model.to_string()),
            _ => GenerationErrorKind::Api {
                status: status.as_u16(),
                message: error_message(body),
            },
        };
        GenerationError::new(kind)
    }
}

#[async_trait]
impl CompletionDriver for OpenAICompatibleClient {
    #[instrument(skip(self, req), fields(provider = "openai-compatible", model = %self.model, messages = req.messages.len()))]
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, GenerationError> {
        let model = req
            .model
            .as_deref()
            .map(normalize_model_name)
            .unwrap_or(&self.model)
            .to_string();

        let body = ChatCompletionRequest::builder()
            .model(model.clone())
            .messages(req.messages.iter().map(ChatMessage::from).collect::<Vec<_>>())
            .temperature(req.temperature.or(self.temperature))
            .max_tokens(req.max_tokens.or(self.max_tokens))
            .build()
            .map_err(|e| GenerationError::new(GenerationErrorKind::RequestBuild(e.to_string())))?;

        let url = self.completions_url();
        debug!(url = %url, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                GenerationError::new(GenerationErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Chat completion request rejected");
            return Err(Self::error_for_status(status, &text, &model));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            GenerationError::new(GenerationErrorKind::ResponseParsing(e.to_string()))
        })?;

        let usage = parsed.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        });
        let answered_by = parsed.model.or(Some(model));

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::new(GenerationErrorKind::EmptyResponse))?;

        debug!(chars = text.len(), ?usage, "Received chat completion");

        Ok(GenerateResponse {
            text,
            model: answered_by,
            usage,
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai-compatible"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn build_http_client(timeout_secs: u64) -> Result<Client, GenerationError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| {
            GenerationError::new(GenerationErrorKind::Http(format!(
                "Failed to initialize HTTP client: {}",
                e
            )))
        })
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, GenerationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GenerationError::new(GenerationErrorKind::MissingConfiguration(name.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_api_key() {
        let config = GenerationConfig::default().with_model("gpt-4o-mini".to_string());
        let err = OpenAICompatibleClient::from_config(&config).unwrap_err();
        assert!(matches!(
            err.kind,
            GenerationErrorKind::MissingConfiguration(ref name) if name.contains("LLM_API_KEY")
        ));
    }

    #[test]
    fn test_from_config_defaults_endpoint_and_strips_prefix() {
        let config = GenerationConfig::default()
            .with_model("openai/mistralai/mistral-7b-instruct-v0.3".to_string())
            .with_api_key("key".to_string());
        let client = OpenAICompatibleClient::from_config(&config).unwrap();
        assert_eq!(client.model_name(), "mistralai/mistral-7b-instruct-v0.3");
        assert_eq!(
            client.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_status_mapping() {
        let err = OpenAICompatibleClient::error_for_status(StatusCode::TOO_MANY_REQUESTS, "", "m");
        assert_eq!(err.kind, GenerationErrorKind::RateLimit);

        let err = OpenAICompatibleClient::error_for_status(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Invalid API key"}}"#,
            "m",
        );
        assert_eq!(
            err.kind,
            GenerationErrorKind::Api {
                status: 401,
                message: "Invalid API key".to_string()
            }
        );
    }
}
