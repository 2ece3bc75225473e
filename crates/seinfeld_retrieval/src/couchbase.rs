//! Vector search through the Couchbase query service.
//!
//! Statements go to the query service REST endpoint with HTTP basic auth.
//! Ranking uses `APPROX_VECTOR_DISTANCE` with the `DOT` metric, which returns
//! the negated dot product; scores are negated back so higher is better.

use crate::memory::metadata_from_row;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use seinfeld_core::{RetrievalConfig, RetrievalMatch};
use seinfeld_error::{RetrievalError, RetrievalErrorKind};
use seinfeld_interface::VectorIndex;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const QUERY_PATH: &str = "/query/service";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    errors: Vec<QueryErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct QueryErrorEntry {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: String,
}

/// Derive the query service URL from a cluster connection string.
///
/// `couchbase://host` maps to plain HTTP on port 8093, `couchbases://host`
/// to TLS on port 18093. Only the first host is used and key-value ports in
/// the connection string are ignored. `http(s)://` URLs are taken as the
/// query service base.
///
/// ```
/// use seinfeld_retrieval::query_service_url;
///
/// assert_eq!(
///     query_service_url("couchbase://localhost").unwrap(),
///     "http://localhost:8093/query/service"
/// );
/// assert_eq!(
///     query_service_url("couchbases://cb.example.com,cb2.example.com?ssl=no_verify").unwrap(),
///     "https://cb.example.com:18093/query/service"
/// );
/// assert_eq!(
///     query_service_url("http://127.0.0.1:9000").unwrap(),
///     "http://127.0.0.1:9000/query/service"
/// );
/// ```
pub fn query_service_url(connection_string: &str) -> Result<String, RetrievalError> {
    let connection_string = connection_string.trim();
    let invalid = || {
        RetrievalError::new(RetrievalErrorKind::ConnectionFailure(format!(
            "Unsupported connection string '{}'",
            connection_string
        )))
    };

    if connection_string.starts_with("http://") || connection_string.starts_with("https://") {
        let base = connection_string.trim_end_matches('/');
        return Ok(if base.ends_with(QUERY_PATH) {
            base.to_string()
        } else {
            format!("{}{}", base, QUERY_PATH)
        });
    }

    let (scheme, port, rest) = if let Some(rest) = connection_string.strip_prefix("couchbases://") {
        ("https", 18093, rest)
    } else if let Some(rest) = connection_string.strip_prefix("couchbase://") {
        ("http", 8093, rest)
    } else {
        return Err(invalid());
    };

    let host = rest
        .split(['?', '/'])
        .next()
        .and_then(|hosts| hosts.split(',').next())
        .map(|host| host.split(':').next().unwrap_or(host))
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .ok_or_else(invalid)?;

    Ok(format!("{}://{}:{}{}", scheme, host, port, QUERY_PATH))
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// A [`VectorIndex`] backed by a Couchbase collection of dialogue documents.
#[derive(Debug, Clone)]
pub struct CouchbaseQueryIndex {
    client: Client,
    query_url: String,
    username: String,
    password: String,
    keyspace: String,
    text_key: String,
    embedding_key: String,
}

impl CouchbaseQueryIndex {
    /// Create an index client with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionFailure` if the HTTP client cannot be initialized.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        query_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        bucket: &str,
        scope: &str,
        collection: &str,
        text_key: impl Into<String>,
        embedding_key: impl Into<String>,
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
            query_url: query_url.into(),
            username: username.into(),
            password: password.into(),
            keyspace: format!(
                "{}.{}.{}",
                quote_identifier(bucket),
                quote_identifier(scope),
                quote_identifier(collection)
            ),
            text_key: text_key.into(),
            embedding_key: embedding_key.into(),
        })
    }

    /// Create an index client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationMissing` naming every absent setting, or
    /// `ConnectionFailure` for an unusable connection string.
    #[instrument(skip(config))]
    pub fn from_config(config: &RetrievalConfig) -> Result<Self, RetrievalError> {
        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(RetrievalError::new(RetrievalErrorKind::ConfigurationMissing(
                missing.join(", "),
            )));
        }

        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        let namespace = config.namespace();
        let query_url = query_service_url(&value(config.connection_string()))?;
        debug!(query_url = %query_url, "Configuring Couchbase query index");

        Self::new(
            query_url,
            value(config.username()),
            value(config.password()),
            &value(namespace.bucket()),
            &value(namespace.scope()),
            &value(namespace.collection()),
            config.text_key().clone(),
            config.embedding_key().clone(),
        )
    }

    /// The vector search statement.
    pub fn search_statement(&self, allowed_fields: &[&str], filter_character: bool) -> String {
        let mut projection = vec![format!("d.{} AS text", quote_identifier(&self.text_key))];
        projection.extend(allowed_fields.iter().map(|field| {
            let quoted = quote_identifier(field);
            format!("d.{} AS {}", quoted, quoted)
        }));
        projection.push(format!(
            "APPROX_VECTOR_DISTANCE(d.{}, $vec, \"DOT\") AS distance",
            quote_identifier(&self.embedding_key)
        ));

        let filter = if filter_character {
            " WHERE d.`Character` = $character"
        } else {
            ""
        };

        format!(
            "SELECT {} FROM {} AS d{} ORDER BY distance LIMIT $k",
            projection.join(", "),
            self.keyspace,
            filter
        )
    }

    async fn execute(&self, body: Value) -> Result<Vec<Value>, RetrievalError> {
        let response = self
            .client
            .post(&self.query_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                RetrievalError::new(RetrievalErrorKind::ConnectionFailure(format!(
                    "Query service unreachable: {}",
                    e
                )))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RetrievalError::new(RetrievalErrorKind::ConnectionFailure(
                format!("Authentication rejected by query service (HTTP {})", status.as_u16()),
            )));
        }

        let text = response.text().await.map_err(|e| {
            RetrievalError::new(RetrievalErrorKind::QueryFailure(format!(
                "Failed to read query response: {}",
                e
            )))
        })?;

        let parsed: QueryResponse = serde_json::from_str(&text).map_err(|e| {
            RetrievalError::new(RetrievalErrorKind::QueryFailure(format!(
                "HTTP {}: unparseable response: {}",
                status.as_u16(),
                e
            )))
        })?;

        if !status.is_success() || !parsed.errors.is_empty() {
            let detail = parsed
                .errors
                .iter()
                .map(|e| match e.code {
                    Some(code) => format!("[{}] {}", code, e.msg),
                    None => e.msg.clone(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RetrievalError::new(RetrievalErrorKind::QueryFailure(format!(
                "HTTP {} ({}): {}",
                status.as_u16(),
                parsed.status.as_deref().unwrap_or("unknown"),
                detail
            ))));
        }

        Ok(parsed.results)
    }
}

#[async_trait]
impl VectorIndex for CouchbaseQueryIndex {
    #[instrument(skip(self, embedding, allowed_fields), fields(keyspace = %self.keyspace))]
    async fn similarity_search(
        &self,
        embedding: &[f32],
        k: usize,
        allowed_fields: &[&str],
        character_filter: Option<&str>,
    ) -> Result<Vec<RetrievalMatch>, RetrievalError> {
        let statement = self.search_statement(allowed_fields, character_filter.is_some());
        debug!(statement = %statement, "Running vector search");

        let mut body = Map::new();
        body.insert("statement".to_string(), Value::String(statement));
        body.insert("$vec".to_string(), json!(embedding));
        body.insert("$k".to_string(), json!(k));
        if let Some(character) = character_filter {
            body.insert("$character".to_string(), json!(character));
        }

        let rows = self.execute(Value::Object(body)).await?;

        let matches = rows
            .iter()
            .filter_map(|row| {
                let Some(text) = row.get("text").and_then(Value::as_str) else {
                    warn!("Skipping result row without dialogue text");
                    return None;
                };
                let distance = row.get("distance").and_then(Value::as_f64).unwrap_or(0.0);
                Some(RetrievalMatch {
                    dialogue_text: text.to_string(),
                    episode_metadata: metadata_from_row(row),
                    relevance_score: -distance as f32,
                    context: None,
                })
            })
            .collect();

        Ok(matches)
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), RetrievalError> {
        self.execute(json!({"statement": "SELECT RAW 1"})).await?;
        debug!("Query service ready");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "couchbase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seinfeld_core::RetrievalNamespace;
    use seinfeld_interface::ALLOWED_FIELDS;

    fn index() -> CouchbaseQueryIndex {
        CouchbaseQueryIndex::new(
            "http://localhost:8093/query/service",
            "user",
            "pass",
            "seinfeld",
            "scripts",
            "dialogue",
            "Dialogue",
            "dialogue_embedding",
        )
        .unwrap()
    }

    #[test]
    fn test_statement_shape() {
        let statement = index().search_statement(ALLOWED_FIELDS, false);
        assert_eq!(
            statement,
            "SELECT d.`Dialogue` AS text, d.`Character` AS `Character`, d.`EpisodeNo` AS `EpisodeNo`, \
             d.`Season` AS `Season`, APPROX_VECTOR_DISTANCE(d.`dialogue_embedding`, $vec, \"DOT\") AS distance \
             FROM `seinfeld`.`scripts`.`dialogue` AS d ORDER BY distance LIMIT $k"
        );
    }

    #[test]
    fn test_statement_with_character_filter() {
        let statement = index().search_statement(&["Character"], true);
        assert!(statement.contains(" WHERE d.`Character` = $character ORDER BY"));
    }

    #[test]
    fn test_identifiers_escaped() {
        assert_eq!(quote_identifier("odd`name"), "`odd``name`");
    }

    #[test]
    fn test_unsupported_connection_string() {
        assert!(query_service_url("redis://localhost").is_err());
        assert!(query_service_url("couchbase://").is_err());
    }

    #[test]
    fn test_from_config_reports_missing_fields() {
        let config = RetrievalConfig::default()
            .with_connection_string("couchbase://localhost".to_string())
            .with_namespace(RetrievalNamespace::default().with_bucket("b".to_string()));
        let err = CouchbaseQueryIndex::from_config(&config).unwrap_err();
        match err.kind {
            RetrievalErrorKind::ConfigurationMissing(fields) => {
                assert!(fields.contains("retrieval.username"));
                assert!(fields.contains("retrieval.namespace.scope"));
                assert!(!fields.contains("retrieval.namespace.bucket"));
            }
            other => panic!("unexpected error kind: {:?}", other),
        }
    }
}
