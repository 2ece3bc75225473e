//! Backend clients for the Seinfeld script generator.
//!
//! Both clients speak the OpenAI wire format, which Capella AI, OpenAI and
//! most self-hosted gateways accept:
//!
//! - [`OpenAICompatibleClient`] implements [`CompletionDriver`](seinfeld_interface::CompletionDriver)
//!   over `POST {endpoint}/chat/completions`
//! - [`OpenAICompatibleEmbeddings`] implements [`Embeddings`](seinfeld_interface::Embeddings)
//!   over `POST {endpoint}/embeddings`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chat;
mod dto;
mod embeddings;

pub use chat::OpenAICompatibleClient;
pub use embeddings::OpenAICompatibleEmbeddings;

/// Base URL used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Strip the routing prefix some configurations carry (`openai/gpt-4o` → `gpt-4o`).
///
/// ```
/// use seinfeld_models::normalize_model_name;
///
/// assert_eq!(normalize_model_name("openai/mistralai/mistral-7b"), "mistralai/mistral-7b");
/// assert_eq!(normalize_model_name("gpt-4o-mini"), "gpt-4o-mini");
/// ```
pub fn normalize_model_name(model: &str) -> &str {
    let model = model.trim();
    model.strip_prefix("openai/").unwrap_or(model)
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
