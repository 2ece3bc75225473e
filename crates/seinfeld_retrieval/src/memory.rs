//! Brute-force cosine index over an in-memory corpus.

use crate::similarity::{cosine_similarity, rank_matches};
use async_trait::async_trait;
use seinfeld_core::{EpisodeMetadata, RetrievalMatch};
use seinfeld_error::{RetrievalError, RetrievalErrorKind};
use seinfeld_interface::VectorIndex;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, instrument};

/// One line of dialogue with its precomputed embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDialogue {
    /// The dialogue text
    pub text: String,
    /// Episode and speaker
    pub metadata: EpisodeMetadata,
    /// Precomputed embedding
    pub embedding: Vec<f32>,
}

/// A vector index held entirely in memory.
///
/// Documents use the same shape as the cluster collection: a JSON array of
/// objects with the dialogue under `text_key`, the vector under
/// `embedding_key`, and `Character`, `EpisodeNo`, `Season` metadata.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    documents: Vec<IndexedDialogue>,
}

impl InMemoryIndex {
    /// Build an index from already-embedded dialogue.
    pub fn new(documents: Vec<IndexedDialogue>) -> Self {
        Self { documents }
    }

    /// Add one document.
    pub fn insert(&mut self, document: IndexedDialogue) {
        self.documents.push(document);
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Parse a JSON corpus.
    ///
    /// # Errors
    ///
    /// Returns `CorpusLoad` if the JSON is not an array of objects or a
    /// document lacks its text or embedding.
    pub fn from_json_str(
        json: &str,
        text_key: &str,
        embedding_key: &str,
    ) -> Result<Self, RetrievalError> {
        let value: Value = serde_json::from_str(json).map_err(|e| corpus_error(e.to_string()))?;
        let rows = value
            .as_array()
            .ok_or_else(|| corpus_error("expected a JSON array of documents"))?;

        let documents = rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_document(i, row, text_key, embedding_key))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(documents))
    }

    /// Read and parse a JSON corpus file.
    ///
    /// # Errors
    ///
    /// Returns `CorpusLoad` if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_json_file(
        path: impl AsRef<Path>,
        text_key: &str,
        embedding_key: &str,
    ) -> Result<Self, RetrievalError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| corpus_error(format!("{}: {}", path.as_ref().display(), e)))?;
        let index = Self::from_json_str(&json, text_key, embedding_key)?;
        debug!(documents = index.len(), "Loaded dialogue corpus");
        Ok(index)
    }
}

fn corpus_error(message: impl Into<String>) -> RetrievalError {
    RetrievalError::new(RetrievalErrorKind::CorpusLoad(message.into()))
}

fn parse_document(
    position: usize,
    row: &Value,
    text_key: &str,
    embedding_key: &str,
) -> Result<IndexedDialogue, RetrievalError> {
    let text = row
        .get(text_key)
        .and_then(Value::as_str)
        .ok_or_else(|| corpus_error(format!("document {} has no '{}' text", position, text_key)))?;

    let embedding = row
        .get(embedding_key)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            corpus_error(format!(
                "document {} has no '{}' vector",
                position, embedding_key
            ))
        })?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect::<Option<Vec<f32>>>()
        .ok_or_else(|| {
            corpus_error(format!(
                "document {} has a non-numeric '{}' component",
                position, embedding_key
            ))
        })?;

    Ok(IndexedDialogue {
        text: text.to_string(),
        metadata: metadata_from_row(row),
        embedding,
    })
}

/// Read `Character`, `EpisodeNo` and `Season` from a document or result row.
///
/// Numbers stored as strings are accepted.
pub(crate) fn metadata_from_row(row: &Value) -> EpisodeMetadata {
    fn number(value: Option<&Value>) -> Option<u32> {
        match value? {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    EpisodeMetadata {
        season: number(row.get("Season")),
        episode: number(row.get("EpisodeNo")),
        character: row
            .get("Character")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    #[instrument(skip(self, embedding, allowed_fields), fields(documents = self.documents.len()))]
    async fn similarity_search(
        &self,
        embedding: &[f32],
        k: usize,
        allowed_fields: &[&str],
        character_filter: Option<&str>,
    ) -> Result<Vec<RetrievalMatch>, RetrievalError> {
        if let Some(first) = self.documents.first() {
            if first.embedding.len() != embedding.len() {
                return Err(RetrievalError::new(RetrievalErrorKind::DimensionMismatch {
                    expected: first.embedding.len(),
                    actual: embedding.len(),
                }));
            }
        }

        let keep = |field: &str| allowed_fields.contains(&field);

        let matches = self
            .documents
            .iter()
            .filter(|doc| match character_filter {
                Some(wanted) => doc
                    .metadata
                    .character
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(wanted)),
                None => true,
            })
            .map(|doc| RetrievalMatch {
                dialogue_text: doc.text.clone(),
                episode_metadata: EpisodeMetadata {
                    season: doc.metadata.season.filter(|_| keep("Season")),
                    episode: doc.metadata.episode.filter(|_| keep("EpisodeNo")),
                    character: doc.metadata.character.clone().filter(|_| keep("Character")),
                },
                relevance_score: cosine_similarity(embedding, &doc.embedding),
                context: None,
            })
            .collect();

        Ok(rank_matches(matches, k))
    }

    async fn ping(&self) -> Result<(), RetrievalError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seinfeld_interface::ALLOWED_FIELDS;

    const CORPUS: &str = r#"[
        {"Dialogue": "I'm out there, Jerry, and I'm loving every minute of it!", "Character": "KRAMER", "EpisodeNo": 5, "Season": "8", "dialogue_embedding": [1.0, 0.0]},
        {"Dialogue": "These pretzels are making me thirsty.", "Character": "KRAMER", "EpisodeNo": 1, "Season": 7, "dialogue_embedding": [0.6, 0.8]},
        {"Dialogue": "It's not a lie if you believe it.", "Character": "GEORGE", "EpisodeNo": 16, "Season": 6, "dialogue_embedding": [0.0, 1.0]}
    ]"#;

    fn index() -> InMemoryIndex {
        InMemoryIndex::from_json_str(CORPUS, "Dialogue", "dialogue_embedding").unwrap()
    }

    #[tokio::test]
    async fn test_ranked_by_cosine() {
        let results = index()
            .similarity_search(&[1.0, 0.0], 2, ALLOWED_FIELDS, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].dialogue_text.starts_with("I'm out there"));
        assert_eq!(results[0].episode_metadata.season, Some(8));
        assert!(results[0].relevance_score >= results[1].relevance_score);
    }

    #[tokio::test]
    async fn test_character_filter_case_insensitive() {
        let results = index()
            .similarity_search(&[1.0, 0.0], 5, ALLOWED_FIELDS, Some("george"))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].episode_metadata.character.as_deref(), Some("GEORGE"));
    }

    #[tokio::test]
    async fn test_fields_outside_allow_list_dropped() {
        let results = index()
            .similarity_search(&[1.0, 0.0], 1, &["Character"], None)
            .await
            .unwrap();
        assert_eq!(results[0].episode_metadata.season, None);
        assert_eq!(results[0].episode_metadata.episode, None);
        assert!(results[0].episode_metadata.character.is_some());
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let err = index()
            .similarity_search(&[1.0, 0.0, 0.0], 1, ALLOWED_FIELDS, None)
            .await
            .unwrap_err();
        assert_eq!(
            err.kind,
            RetrievalErrorKind::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_missing_embedding_rejected() {
        let err = InMemoryIndex::from_json_str(
            r#"[{"Dialogue": "Serenity now!"}]"#,
            "Dialogue",
            "dialogue_embedding",
        )
        .unwrap_err();
        assert!(matches!(err.kind, RetrievalErrorKind::CorpusLoad(_)));
    }
}
