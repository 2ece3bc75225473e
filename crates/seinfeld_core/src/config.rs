//! Layered configuration for the generation and retrieval backends.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (`seinfeld.toml` shipped inside this crate)
//! 2. `~/.config/seinfeld/seinfeld.toml`
//! 3. `./seinfeld.toml`
//! 4. Environment variables (`LLM_API_KEY`, `CB_BUCKET`, ...)
//!
//! Every credential is optional at load time. Missing retrieval settings put
//! the retrieval tool into degraded mode; missing generation settings are
//! reported when the generation client is built.

use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use seinfeld_error::{ConfigError, SeinfeldError, SeinfeldResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../seinfeld.toml");

/// Environment variable → configuration key.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("LLM_MODEL_NAME", "generation.model"),
    ("LLM_API_KEY", "generation.api_key"),
    ("CAPELLA_AI_ENDPOINT", "generation.endpoint"),
    ("CAPELLA_AI_ENDPOINT", "embedding.endpoint"),
    ("EMBEDDING_MODEL_NAME", "embedding.model"),
    ("EMBEDDING_API_KEY", "embedding.api_key"),
    ("CB_CONNECTION_STRING", "retrieval.connection_string"),
    ("CB_USERNAME", "retrieval.username"),
    ("CB_PASSWORD", "retrieval.password"),
    ("CB_BUCKET", "retrieval.namespace.bucket"),
    ("CB_SCOPE", "retrieval.namespace.scope"),
    ("CB_COLLECTION", "retrieval.namespace.collection"),
];

fn default_request_timeout() -> u64 {
    120
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_result_count() -> usize {
    crate::DEFAULT_RESULT_COUNT
}

fn default_text_key() -> String {
    "Dialogue".to_string()
}

fn default_embedding_key() -> String {
    "dialogue_embedding".to_string()
}

/// Text-generation backend settings.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Deserialize,
    Serialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_", strip_option)]
pub struct GenerationConfig {
    /// Model identifier
    #[serde(default)]
    model: Option<String>,
    /// Bearer token for the backend
    #[serde(default, skip_serializing)]
    api_key: Option<String>,
    /// OpenAI-compatible base URL, e.g. `https://example.cloud.couchbase.com/v1`
    #[serde(default)]
    endpoint: Option<String>,
    /// Default sampling temperature
    #[serde(default)]
    temperature: Option<f32>,
    /// Default completion budget per stage
    #[serde(default)]
    max_tokens: Option<u32>,
    /// Whole-request timeout
    #[serde(default = "default_request_timeout")]
    request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: None,
            api_key: None,
            endpoint: None,
            temperature: None,
            max_tokens: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl GenerationConfig {
    /// Names of required settings that are absent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.model) {
            missing.push("generation.model");
        }
        if is_blank(&self.api_key) {
            missing.push("generation.api_key");
        }
        missing
    }
}

/// Embedding provider settings.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Deserialize,
    Serialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_", strip_option)]
pub struct EmbeddingConfig {
    /// Embedding model identifier
    #[serde(default)]
    model: Option<String>,
    /// Bearer token for the embedding endpoint
    #[serde(default, skip_serializing)]
    api_key: Option<String>,
    /// OpenAI-compatible base URL
    #[serde(default)]
    endpoint: Option<String>,
}

impl EmbeddingConfig {
    /// Names of required settings that are absent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.model) {
            missing.push("embedding.model");
        }
        if is_blank(&self.api_key) {
            missing.push("embedding.api_key");
        }
        if is_blank(&self.endpoint) {
            missing.push("embedding.endpoint");
        }
        missing
    }
}

/// Bucket / scope / collection holding the indexed dialogue.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_", strip_option)]
pub struct RetrievalNamespace {
    /// Bucket name
    #[serde(default)]
    bucket: Option<String>,
    /// Scope name
    #[serde(default)]
    scope: Option<String>,
    /// Collection name
    #[serde(default)]
    collection: Option<String>,
}

/// Semantic index settings.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Deserialize,
    Serialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_", strip_option)]
pub struct RetrievalConfig {
    /// Cluster connection string, e.g. `couchbase://localhost`
    #[serde(default)]
    connection_string: Option<String>,
    /// Cluster user
    #[serde(default)]
    username: Option<String>,
    /// Cluster password
    #[serde(default, skip_serializing)]
    password: Option<String>,
    /// Where the dialogue documents live
    #[serde(default)]
    namespace: RetrievalNamespace,
    /// Document field holding the dialogue text
    #[serde(default = "default_text_key")]
    text_key: String,
    /// Document field holding the precomputed embedding
    #[serde(default = "default_embedding_key")]
    embedding_key: String,
    /// Result count used by stages that do not specify one
    #[serde(default = "default_result_count")]
    default_result_count: usize,
    /// Readiness probe timeout at construction
    #[serde(default = "default_connect_timeout")]
    connect_timeout_secs: u64,
    /// Skip the backend entirely and serve illustrative passages
    #[serde(default)]
    demo: bool,
    /// Local JSON corpus served from memory instead of the cluster
    #[serde(default)]
    corpus_path: Option<PathBuf>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            username: None,
            password: None,
            namespace: RetrievalNamespace::default(),
            text_key: default_text_key(),
            embedding_key: default_embedding_key(),
            default_result_count: default_result_count(),
            connect_timeout_secs: default_connect_timeout(),
            demo: false,
            corpus_path: None,
        }
    }
}

impl RetrievalConfig {
    /// Names of required cluster settings that are absent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.connection_string) {
            missing.push("retrieval.connection_string");
        }
        if is_blank(&self.username) {
            missing.push("retrieval.username");
        }
        if is_blank(&self.password) {
            missing.push("retrieval.password");
        }
        if is_blank(&self.namespace.bucket) {
            missing.push("retrieval.namespace.bucket");
        }
        if is_blank(&self.namespace.scope) {
            missing.push("retrieval.namespace.scope");
        }
        if is_blank(&self.namespace.collection) {
            missing.push("retrieval.namespace.collection");
        }
        missing
    }
}

/// Top-level configuration, built once at startup and passed by reference.
///
/// # Example
///
/// ```no_run
/// use seinfeld_core::SeinfeldConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SeinfeldConfig::load()?;
/// println!("model: {:?}", config.generation().model());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Deserialize,
    Serialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct SeinfeldConfig {
    /// Text-generation backend
    #[serde(default)]
    generation: GenerationConfig,
    /// Embedding provider
    #[serde(default)]
    embedding: EmbeddingConfig,
    /// Semantic index
    #[serde(default)]
    retrieval: RetrievalConfig,
}

impl SeinfeldConfig {
    /// Load bundled defaults, user files and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed.
    #[instrument]
    pub fn load() -> SeinfeldResult<Self> {
        Self::load_with_env(|key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load) with an injectable environment lookup.
    ///
    /// Blank values are treated as unset.
    #[instrument(skip(lookup))]
    pub fn load_with_env<F>(lookup: F) -> SeinfeldResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled");

        let mut builder = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/seinfeld/seinfeld.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("seinfeld").required(false));

        Self::finish(apply_env(builder, lookup)?)
    }

    /// Load bundled defaults overridden by one specific file.
    ///
    /// The environment is not consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> SeinfeldResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));

        Self::finish(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> SeinfeldResult<Self> {
        builder
            .build()
            .map_err(|e| {
                SeinfeldError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                SeinfeldError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}

fn apply_env<F>(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> SeinfeldResult<ConfigBuilder<DefaultState>>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in ENV_OVERRIDES {
        let value = lookup(var).filter(|v| !v.trim().is_empty());
        if value.is_some() {
            debug!(var, key, "Applying environment override");
        }
        builder = builder.set_override_option(*key, value).map_err(|e| {
            SeinfeldError::from(ConfigError::new(format!(
                "Invalid override for {}: {}",
                key, e
            )))
        })?;
    }
    Ok(builder)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}
