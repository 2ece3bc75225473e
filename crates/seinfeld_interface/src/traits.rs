//! Backend traits.

use async_trait::async_trait;
use seinfeld_core::{GenerateRequest, GenerateResponse, RetrievalMatch};
use seinfeld_error::{GenerationError, RetrievalError};

/// Metadata fields a similarity search may return alongside the dialogue.
pub const ALLOWED_FIELDS: &[&str] = &["Character", "EpisodeNo", "Season"];

/// A text-generation backend.
///
/// Implementations make exactly one backend call per `generate` and never
/// retry; the pipeline treats any error as the failure of the calling stage.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Produce a completion for the request.
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, GenerationError>;

    /// Provider name (e.g., "openai-compatible", "mock").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier.
    fn model_name(&self) -> &str;
}

/// An embedding provider.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Embed one or more texts, returning one vector per input in order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError>;

    /// Embed a single text.
    async fn embed_single(&self, input: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut vectors = self.embed(&[input.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            RetrievalError::new(seinfeld_error::RetrievalErrorKind::Embedding(
                "Provider returned no vectors".to_string(),
            ))
        })
    }

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// Semantic similarity search over labeled dialogue.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` matches for `embedding`, most relevant first.
    ///
    /// `allowed_fields` names the metadata to return with each match;
    /// `character_filter` restricts matches to one speaker.
    async fn similarity_search(
        &self,
        embedding: &[f32],
        k: usize,
        allowed_fields: &[&str],
        character_filter: Option<&str>,
    ) -> Result<Vec<RetrievalMatch>, RetrievalError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), RetrievalError>;

    /// Backend name for logs.
    fn backend_name(&self) -> &'static str;
}
