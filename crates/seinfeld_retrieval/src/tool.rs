//! The retrieval tool shared by every generation stage.

use crate::{CouchbaseQueryIndex, InMemoryIndex, demo_passages, rank_matches};
use seinfeld_core::{DegradedReason, RetrievalOutcome, RetrievalQuery, SeinfeldConfig};
use seinfeld_interface::{ALLOWED_FIELDS, Embeddings, VectorIndex};
use seinfeld_models::OpenAICompatibleEmbeddings;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

enum ToolMode {
    Connected {
        embedder: Arc<dyn Embeddings>,
        index: Arc<dyn VectorIndex>,
    },
    Degraded(DegradedReason),
}

/// Finds reference dialogue for a query.
///
/// The mode is decided once, at construction: either the backend answered
/// its readiness probe and every search goes to it, or the tool is degraded
/// for its whole lifetime and every search returns illustrative passages.
/// A connected tool still falls back per call when a search fails or finds
/// nothing.
///
/// The tool is immutable after construction and meant to be shared through
/// an `Arc`.
pub struct RetrievalTool {
    mode: ToolMode,
}

impl std::fmt::Debug for RetrievalTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.mode {
            ToolMode::Connected { embedder, index } => f
                .debug_struct("RetrievalTool")
                .field("backend", &index.backend_name())
                .field("embedding_model", &embedder.model_name())
                .finish(),
            ToolMode::Degraded(reason) => f
                .debug_struct("RetrievalTool")
                .field("degraded", reason)
                .finish(),
        }
    }
}

impl RetrievalTool {
    /// Build the tool from configuration. Never fails.
    ///
    /// Uses the local corpus when `retrieval.corpus_path` is set and the
    /// Couchbase query service otherwise. Any missing setting, unreadable
    /// corpus, or failed readiness probe yields a degraded tool.
    #[instrument(skip(config))]
    pub async fn connect(config: &SeinfeldConfig) -> Self {
        let retrieval = config.retrieval();

        if *retrieval.demo() {
            info!("Retrieval running in demo mode by request");
            return Self::degraded(DegradedReason::Forced);
        }

        let embedder = match OpenAICompatibleEmbeddings::from_config(config.embedding()) {
            Ok(embedder) => embedder,
            Err(e) => return Self::unavailable(e.kind.to_string()),
        };

        let index: Arc<dyn VectorIndex> = match retrieval.corpus_path() {
            Some(path) => {
                match InMemoryIndex::from_json_file(
                    path,
                    retrieval.text_key(),
                    retrieval.embedding_key(),
                ) {
                    Ok(index) => Arc::new(index),
                    Err(e) => return Self::unavailable(e.kind.to_string()),
                }
            }
            None => match CouchbaseQueryIndex::from_config(retrieval) {
                Ok(index) => Arc::new(index),
                Err(e) => return Self::unavailable(e.kind.to_string()),
            },
        };

        Self::with_backend(
            Arc::new(embedder),
            index,
            Duration::from_secs(*retrieval.connect_timeout_secs()),
        )
        .await
    }

    /// Probe `index` and build a connected tool, or a degraded one if the
    /// probe fails or does not answer within `probe_timeout`.
    #[instrument(skip(embedder, index), fields(backend = index.backend_name()))]
    pub async fn with_backend(
        embedder: Arc<dyn Embeddings>,
        index: Arc<dyn VectorIndex>,
        probe_timeout: Duration,
    ) -> Self {
        match tokio::time::timeout(probe_timeout, index.ping()).await {
            Ok(Ok(())) => {
                info!(embedding_model = embedder.model_name(), "Retrieval backend ready");
                Self::from_parts(embedder, index)
            }
            Ok(Err(e)) => Self::unavailable(e.kind.to_string()),
            Err(_) => Self::unavailable(format!(
                "readiness probe timed out after {}s",
                probe_timeout.as_secs()
            )),
        }
    }

    /// Build a connected tool without probing.
    pub fn from_parts(embedder: Arc<dyn Embeddings>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            mode: ToolMode::Connected { embedder, index },
        }
    }

    /// Build a tool that only serves illustrative passages.
    pub fn degraded(reason: DegradedReason) -> Self {
        Self {
            mode: ToolMode::Degraded(reason),
        }
    }

    fn unavailable(cause: String) -> Self {
        warn!(cause = %cause, "Could not initialize retrieval backend; serving demo passages");
        Self::degraded(DegradedReason::Unavailable(cause))
    }

    /// Whether every search will return illustrative passages.
    pub fn is_degraded(&self) -> bool {
        matches!(self.mode, ToolMode::Degraded(_))
    }

    /// Why the tool is degraded, if it is.
    pub fn degraded_reason(&self) -> Option<&DegradedReason> {
        match &self.mode {
            ToolMode::Degraded(reason) => Some(reason),
            ToolMode::Connected { .. } => None,
        }
    }

    /// Find reference dialogue. Never fails.
    ///
    /// Real matches come back in non-increasing score order, at most
    /// `query.result_count()` of them.
    #[instrument(skip(self, query), fields(query = query.query_text(), k = query.result_count()))]
    pub async fn search(&self, query: &RetrievalQuery) -> RetrievalOutcome {
        let (embedder, index) = match &self.mode {
            ToolMode::Degraded(reason) => return fallback(query, reason.clone()),
            ToolMode::Connected { embedder, index } => (embedder, index),
        };

        let vector = match embedder.embed_single(query.query_text()).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "Embedding failed; serving demo passages");
                return fallback(query, DegradedReason::QueryFailed(e.kind.to_string()));
            }
        };

        let matches = match index
            .similarity_search(
                &vector,
                query.result_count(),
                ALLOWED_FIELDS,
                query.character_filter(),
            )
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "Vector search failed; serving demo passages");
                return fallback(query, DegradedReason::QueryFailed(e.kind.to_string()));
            }
        };

        let matches = rank_matches(matches, query.result_count());
        if matches.is_empty() {
            debug!("No matching dialogue; serving demo passages");
            return fallback(query, DegradedReason::NoMatches);
        }

        debug!(found = matches.len(), "Retrieved reference dialogue");
        RetrievalOutcome::Matches(matches)
    }
}

fn fallback(query: &RetrievalQuery, reason: DegradedReason) -> RetrievalOutcome {
    RetrievalOutcome::Degraded {
        passages: demo_passages(query),
        reason,
    }
}
