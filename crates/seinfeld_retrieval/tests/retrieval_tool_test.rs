//! Behavior of the retrieval tool across connected, degraded and failing backends.

use async_trait::async_trait;
use seinfeld_core::{
    DegradedReason, EmbeddingConfig, EpisodeMetadata, RetrievalConfig, RetrievalMatch,
    RetrievalNamespace, RetrievalOutcome, RetrievalQuery, SeinfeldConfig,
};
use seinfeld_error::{RetrievalError, RetrievalErrorKind};
use seinfeld_interface::{Embeddings, VectorIndex};
use seinfeld_retrieval::{HashEmbeddings, InMemoryIndex, IndexedDialogue, RetrievalTool};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LINES: &[(&str, &str)] = &[
    ("GEORGE", "I'm getting a little tired of this job, Jerry."),
    ("GEORGE", "My boss doesn't even know what I do all day."),
    ("JERRY", "What is the deal with airline food?"),
    ("ELAINE", "Get out!"),
    ("KRAMER", "Giddy up!"),
];

fn corpus(embedder: &HashEmbeddings) -> InMemoryIndex {
    InMemoryIndex::new(
        LINES
            .iter()
            .enumerate()
            .map(|(i, (character, text))| IndexedDialogue {
                text: text.to_string(),
                metadata: EpisodeMetadata {
                    season: Some(3),
                    episode: Some(i as u32 + 1),
                    character: Some(character.to_string()),
                },
                embedding: embedder.vector_for(text),
            })
            .collect(),
    )
}

fn connected_tool() -> RetrievalTool {
    let embedder = HashEmbeddings::new(32);
    let index = corpus(&embedder);
    RetrievalTool::from_parts(Arc::new(embedder), Arc::new(index))
}

struct FailingIndex;

#[async_trait]
impl VectorIndex for FailingIndex {
    async fn similarity_search(
        &self,
        _embedding: &[f32],
        _k: usize,
        _allowed_fields: &[&str],
        _character_filter: Option<&str>,
    ) -> Result<Vec<RetrievalMatch>, RetrievalError> {
        Err(RetrievalError::new(RetrievalErrorKind::QueryFailure(
            "index offline".to_string(),
        )))
    }

    async fn ping(&self) -> Result<(), RetrievalError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

struct SlowIndex;

#[async_trait]
impl VectorIndex for SlowIndex {
    async fn similarity_search(
        &self,
        _embedding: &[f32],
        _k: usize,
        _allowed_fields: &[&str],
        _character_filter: Option<&str>,
    ) -> Result<Vec<RetrievalMatch>, RetrievalError> {
        Ok(vec![])
    }

    async fn ping(&self) -> Result<(), RetrievalError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "slow"
    }
}

#[tokio::test]
async fn test_connected_search_ranks_and_bounds_results() {
    let tool = connected_tool();
    assert!(!tool.is_degraded());

    let query = RetrievalQuery::new("My boss doesn't even know what I do all day.", 3);
    let outcome = tool.search(&query).await;

    let RetrievalOutcome::Matches(matches) = &outcome else {
        panic!("expected real matches, got {:?}", outcome);
    };
    assert!(matches.len() <= 3);
    assert_eq!(matches[0].dialogue_text, LINES[1].1);
    assert!((matches[0].relevance_score - 1.0).abs() < 1e-5);
    assert!(
        matches
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score)
    );
}

#[tokio::test]
async fn test_character_filter_passed_to_index() {
    let tool = connected_tool();
    let query = RetrievalQuery::new("anything at all", 10).with_character("george");
    let outcome = tool.search(&query).await;

    assert!(!outcome.is_degraded());
    assert_eq!(outcome.len(), 2);
    assert!(
        outcome
            .passages()
            .iter()
            .all(|m| m.episode_metadata.character.as_deref() == Some("GEORGE"))
    );
}

#[tokio::test]
async fn test_no_matches_falls_back_to_demo() {
    let tool = connected_tool();
    let query = RetrievalQuery::new("puffy shirt", 5).with_character("NEWMAN");
    let outcome = tool.search(&query).await;

    assert_eq!(outcome.degraded_reason(), Some(&DegradedReason::NoMatches));
    assert_eq!(outcome.len(), 3);
    assert!(outcome.passages()[0].dialogue_text.contains("puffy"));
}

#[tokio::test]
async fn test_search_error_absorbed() {
    let tool = RetrievalTool::from_parts(Arc::new(HashEmbeddings::new(8)), Arc::new(FailingIndex));
    let outcome = tool.search(&RetrievalQuery::new("marble rye", 2)).await;

    assert!(matches!(
        outcome.degraded_reason(),
        Some(DegradedReason::QueryFailed(cause)) if cause.contains("index offline")
    ));
    assert_eq!(outcome.len(), 2);
    // Per-call failures do not degrade the tool itself
    assert!(!tool.is_degraded());
}

#[tokio::test]
async fn test_ping_timeout_degrades_permanently() {
    let tool = RetrievalTool::with_backend(
        Arc::new(HashEmbeddings::new(8)),
        Arc::new(SlowIndex),
        Duration::from_millis(20),
    )
    .await;

    assert!(tool.is_degraded());
    assert!(matches!(
        tool.degraded_reason(),
        Some(DegradedReason::Unavailable(cause)) if cause.contains("timed out")
    ));
}

#[tokio::test]
async fn test_degraded_output_deterministic() {
    let tool = RetrievalTool::degraded(DegradedReason::Forced);
    let query = RetrievalQuery::new("Jerry's smart speaker mishears everything", 5);

    let first = tool.search(&query).await;
    let second = tool.search(&query).await;
    assert_eq!(first, second);
    assert!(
        first
            .passages()
            .iter()
            .all(|p| p.dialogue_text.contains("Jerry's"))
    );
}

#[tokio::test]
async fn test_deserialized_zero_count_query_still_yields_passages() {
    let tool = RetrievalTool::degraded(DegradedReason::Forced);
    let query: RetrievalQuery =
        serde_json::from_value(json!({"query_text": "", "result_count": 0})).unwrap();

    let outcome = tool.search(&query).await;
    assert_eq!(outcome.passages().len(), 1);
}

#[tokio::test]
async fn test_connect_without_configuration_is_degraded() {
    let tool = RetrievalTool::connect(&SeinfeldConfig::default()).await;
    assert!(matches!(
        tool.degraded_reason(),
        Some(DegradedReason::Unavailable(cause)) if cause.contains("embedding.model")
    ));
}

#[tokio::test]
async fn test_connect_demo_flag_forces_fallback() {
    let config =
        SeinfeldConfig::default().with_retrieval(RetrievalConfig::default().with_demo(true));
    let tool = RetrievalTool::connect(&config).await;
    assert_eq!(tool.degraded_reason(), Some(&DegradedReason::Forced));
}

fn embedding_config(server: &MockServer) -> EmbeddingConfig {
    EmbeddingConfig::default()
        .with_model("nv-embed".to_string())
        .with_api_key("embed-key".to_string())
        .with_endpoint(server.uri())
}

async fn mount_embeddings(server: &MockServer, vector: Vec<f32>) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"index": 0, "embedding": vector}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_connect_to_couchbase_query_service() {
    let server = MockServer::start().await;
    mount_embeddings(&server, vec![0.5, 0.25, 0.125]).await;

    Mock::given(method("POST"))
        .and(path("/query/service"))
        .and(body_partial_json(json!({"statement": "SELECT RAW 1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "results": [1]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/query/service"))
        .and(body_partial_json(json!({"$k": 3, "$vec": [0.5, 0.25, 0.125]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "results": [
                {"text": "I'm busting, Jerry! I'm busting!", "Character": "GEORGE", "EpisodeNo": 4, "Season": 4, "distance": -0.71},
                {"text": "I've been working for the Yankees for three years.", "Character": "GEORGE", "EpisodeNo": 12, "Season": 7, "distance": -0.93},
                {"text": "You have to look annoyed.", "Character": "GEORGE", "EpisodeNo": 8, "Season": 5, "distance": -0.52}
            ]
        })))
        .mount(&server)
        .await;

    let namespace = RetrievalNamespace::default()
        .with_bucket("seinfeld".to_string())
        .with_scope("scripts".to_string())
        .with_collection("dialogue".to_string());
    let config = SeinfeldConfig::default()
        .with_embedding(embedding_config(&server))
        .with_retrieval(
            RetrievalConfig::default()
                .with_connection_string(server.uri())
                .with_username("Administrator".to_string())
                .with_password("password".to_string())
                .with_namespace(namespace),
        );

    let tool = RetrievalTool::connect(&config).await;
    assert!(!tool.is_degraded(), "{:?}", tool.degraded_reason());

    let outcome = tool
        .search(&RetrievalQuery::new("George complaining about his job", 3))
        .await;
    let matches = outcome.passages();
    assert!(!outcome.is_degraded());
    assert_eq!(matches.len(), 3);
    assert!(matches[0].dialogue_text.contains("Yankees"));
    assert!((matches[0].relevance_score - 0.93).abs() < 1e-5);
    assert_eq!(matches[2].episode_metadata.season, Some(5));
    assert!(
        matches
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score)
    );
}

#[tokio::test]
async fn test_rejected_credentials_degrade_tool() {
    let server = MockServer::start().await;
    mount_embeddings(&server, vec![1.0]).await;

    Mock::given(method("POST"))
        .and(path("/query/service"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = SeinfeldConfig::default()
        .with_embedding(embedding_config(&server))
        .with_retrieval(
            RetrievalConfig::default()
                .with_connection_string(server.uri())
                .with_username("Administrator".to_string())
                .with_password("wrong".to_string())
                .with_namespace(
                    RetrievalNamespace::default()
                        .with_bucket("b".to_string())
                        .with_scope("s".to_string())
                        .with_collection("c".to_string()),
                ),
        );

    let tool = RetrievalTool::connect(&config).await;
    assert!(matches!(
        tool.degraded_reason(),
        Some(DegradedReason::Unavailable(cause)) if cause.contains("Authentication")
    ));
}

#[tokio::test]
async fn test_connect_with_local_corpus() {
    let server = MockServer::start().await;
    mount_embeddings(&server, vec![0.0, 1.0]).await;

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        "{}",
        json!([
            {"Dialogue": "No soup for you!", "Character": "SOUP NAZI", "dialogue_embedding": [0.0, 1.0]},
            {"Dialogue": "Hello, Newman.", "Character": "JERRY", "dialogue_embedding": [1.0, 0.0]}
        ])
    )
    .unwrap();

    let config = SeinfeldConfig::default()
        .with_embedding(embedding_config(&server))
        .with_retrieval(RetrievalConfig::default().with_corpus_path(file.path().to_path_buf()));

    let tool = RetrievalTool::connect(&config).await;
    let outcome = tool.search(&RetrievalQuery::new("soup", 1)).await;

    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome.passages()[0].dialogue_text, "No soup for you!");
}

#[tokio::test]
async fn test_embedding_provider_usable_directly() {
    let embedder = HashEmbeddings::new(4);
    let vectors = embedder
        .embed(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0].len(), 4);
}
