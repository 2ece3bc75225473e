//! Retrieval query and result types.
//!
//! A [`RetrievalQuery`] is always normalized on construction: the result
//! count is clamped into `[MIN_RESULT_COUNT, MAX_RESULT_COUNT]` and an empty
//! query text is replaced by [`DEFAULT_QUERY`], so the retrieval tool never
//! has to reject a query.

use serde::{Deserialize, Serialize};

/// Smallest number of results a query may ask for.
pub const MIN_RESULT_COUNT: usize = 1;
/// Largest number of results a query may ask for.
pub const MAX_RESULT_COUNT: usize = 10;
/// Result count used when none is given.
pub const DEFAULT_RESULT_COUNT: usize = 5;
/// Query text substituted for empty input.
pub const DEFAULT_QUERY: &str = "this everyday annoyance";
/// Dialogue longer than this many characters is truncated when rendered.
pub const MAX_RENDERED_DIALOGUE: usize = 1000;

/// A request for reference dialogue.
///
/// # Examples
///
/// ```
/// use seinfeld_core::RetrievalQuery;
///
/// let query = RetrievalQuery::new("George complaining about his job", 15);
/// assert_eq!(query.result_count(), 10);
///
/// let query = RetrievalQuery::new("   ", 0);
/// assert_eq!(query.result_count(), 1);
/// assert_eq!(query.query_text(), seinfeld_core::DEFAULT_QUERY);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawRetrievalQuery")]
pub struct RetrievalQuery {
    query_text: String,
    result_count: usize,
    character_filter: Option<String>,
}

/// Wire form of a query; normalized through [`RetrievalQuery::new`].
#[derive(Deserialize)]
struct RawRetrievalQuery {
    #[serde(default)]
    query_text: String,
    #[serde(default = "default_result_count")]
    result_count: usize,
    #[serde(default)]
    character_filter: Option<String>,
}

fn default_result_count() -> usize {
    DEFAULT_RESULT_COUNT
}

impl From<RawRetrievalQuery> for RetrievalQuery {
    fn from(raw: RawRetrievalQuery) -> Self {
        let query = Self::new(raw.query_text, raw.result_count);
        match raw.character_filter {
            Some(character) => query.with_character(character),
            None => query,
        }
    }
}

impl RetrievalQuery {
    /// Build a normalized query.
    pub fn new(query_text: impl Into<String>, result_count: usize) -> Self {
        let query_text = query_text.into();
        let query_text = if query_text.trim().is_empty() {
            DEFAULT_QUERY.to_string()
        } else {
            query_text.trim().to_string()
        };

        Self {
            query_text,
            result_count: result_count.clamp(MIN_RESULT_COUNT, MAX_RESULT_COUNT),
            character_filter: None,
        }
    }

    /// Restrict matches to lines spoken by one character.
    ///
    /// Blank names are ignored.
    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        let character = character.into();
        self.character_filter = if character.trim().is_empty() {
            None
        } else {
            Some(character.trim().to_string())
        };
        self
    }

    /// The (non-empty) query text.
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    /// The clamped result count.
    pub fn result_count(&self) -> usize {
        self.result_count
    }

    /// Optional speaker restriction.
    pub fn character_filter(&self) -> Option<&str> {
        self.character_filter.as_deref()
    }
}

/// Where a line of dialogue comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    /// Season number
    pub season: Option<u32>,
    /// Episode number within the season
    pub episode: Option<u32>,
    /// Speaking character
    pub character: Option<String>,
}

/// One passage returned by a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMatch {
    /// The dialogue text
    pub dialogue_text: String,
    /// Episode and speaker information
    pub episode_metadata: EpisodeMetadata,
    /// Similarity score; higher is more relevant
    pub relevance_score: f32,
    /// Short scene label, used by the illustrative passages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Why the retrieval tool answered with illustrative passages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum DegradedReason {
    /// The backend could not be set up; the tool stays degraded for its lifetime
    #[display("backend unavailable: {}", _0)]
    Unavailable(String),
    /// This particular search failed
    #[display("query failed: {}", _0)]
    QueryFailed(String),
    /// The search succeeded but found nothing
    #[display("no matching dialogue")]
    NoMatches,
    /// Demo mode was requested explicitly
    #[display("demo mode requested")]
    Forced,
}

/// Outcome of a single retrieval call.
///
/// Retrieval never fails from a caller's point of view; when real matches
/// are unavailable the outcome is `Degraded` and still carries usable
/// passages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetrievalOutcome {
    /// Real matches, ordered by descending relevance
    Matches(Vec<RetrievalMatch>),
    /// Illustrative fallback passages
    Degraded {
        /// Why real matches were not returned
        reason: DegradedReason,
        /// Deterministic placeholder passages
        passages: Vec<RetrievalMatch>,
    },
}

impl RetrievalOutcome {
    /// The passages, regardless of where they came from.
    pub fn passages(&self) -> &[RetrievalMatch] {
        match self {
            Self::Matches(matches) => matches,
            Self::Degraded { passages, .. } => passages,
        }
    }

    /// Whether this outcome came from the fallback path.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// The degradation reason, if any.
    pub fn degraded_reason(&self) -> Option<&DegradedReason> {
        match self {
            Self::Matches(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Number of passages.
    pub fn len(&self) -> usize {
        self.passages().len()
    }

    /// Whether there are no passages at all.
    pub fn is_empty(&self) -> bool {
        self.passages().is_empty()
    }

    /// Render the passages as reference material for a generation prompt.
    ///
    /// Dialogue longer than [`MAX_RENDERED_DIALOGUE`] characters is cut and
    /// marked with `...`.
    pub fn to_markdown(&self, query: &RetrievalQuery) -> String {
        let mut output = String::new();

        match self {
            Self::Matches(matches) => {
                output.push_str("## Seinfeld Script Search Results\n");
                output.push_str(&format!("**Query:** {}\n", query.query_text()));
                output.push_str(&format!(
                    "**Found {} relevant examples:**\n\n",
                    matches.len()
                ));
            }
            Self::Degraded { reason, passages } => {
                output.push_str("## Seinfeld Script Search Results (Demo Mode)\n");
                output.push_str(&format!(
                    "**Note:** Running in demo mode - {}.\n",
                    reason
                ));
                output.push_str(&format!("**Query:** {}\n", query.query_text()));
                output.push_str(&format!(
                    "**Showing {} illustrative examples:**\n\n",
                    passages.len()
                ));
            }
        }

        for (i, passage) in self.passages().iter().enumerate() {
            match &passage.context {
                Some(context) => output.push_str(&format!("### Example {} - {}\n", i + 1, context)),
                None => output.push_str(&format!("### Example {}\n", i + 1)),
            }

            let metadata = &passage.episode_metadata;
            match (metadata.season, metadata.episode) {
                (Some(season), Some(episode)) => {
                    output.push_str(&format!("**Episode:** Season {}, Episode {}\n", season, episode))
                }
                (Some(season), None) => output.push_str(&format!("**Episode:** Season {}\n", season)),
                (None, Some(episode)) => output.push_str(&format!("**Episode:** {}\n", episode)),
                (None, None) => {}
            }
            if let Some(character) = &metadata.character {
                output.push_str(&format!("**Character:** {}\n", character));
            }

            if !passage.dialogue_text.is_empty() {
                let truncated = passage.dialogue_text.chars().count() > MAX_RENDERED_DIALOGUE;
                let text: String = passage
                    .dialogue_text
                    .chars()
                    .take(MAX_RENDERED_DIALOGUE)
                    .collect();
                output.push_str("**Dialogue:**\n```\n");
                output.push_str(&text);
                if truncated {
                    output.push_str("...");
                }
                output.push_str("\n```\n");
            }

            if !self.is_degraded() {
                output.push_str(&format!(
                    "**Relevance Score:** {:.4}\n",
                    passage.relevance_score
                ));
            }
            output.push_str("\n---\n\n");
        }

        if self.is_degraded() {
            output.push_str(
                "Use these examples as templates for the style, rhythm, and character voices.\n",
            );
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_count_clamped_into_range() {
        assert_eq!(RetrievalQuery::new("q", 0).result_count(), 1);
        assert_eq!(RetrievalQuery::new("q", 1).result_count(), 1);
        assert_eq!(RetrievalQuery::new("q", 7).result_count(), 7);
        assert_eq!(RetrievalQuery::new("q", 10).result_count(), 10);
        assert_eq!(RetrievalQuery::new("q", 15).result_count(), 10);
    }

    #[test]
    fn test_deserialized_query_is_normalized() {
        let query: RetrievalQuery = serde_json::from_str(
            r#"{"query_text":"","result_count":0,"character_filter":"  "}"#,
        )
        .unwrap();
        assert_eq!(query.query_text(), DEFAULT_QUERY);
        assert_eq!(query.result_count(), MIN_RESULT_COUNT);
        assert_eq!(query.character_filter(), None);

        let query: RetrievalQuery =
            serde_json::from_str(r#"{"query_text":" soup ","result_count":15}"#).unwrap();
        assert_eq!(query.query_text(), "soup");
        assert_eq!(query.result_count(), MAX_RESULT_COUNT);
    }

    #[test]
    fn test_blank_character_filter_ignored() {
        let query = RetrievalQuery::new("q", 3).with_character("  ");
        assert_eq!(query.character_filter(), None);

        let query = RetrievalQuery::new("q", 3).with_character(" KRAMER ");
        assert_eq!(query.character_filter(), Some("KRAMER"));
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = RetrievalOutcome::Degraded {
            reason: DegradedReason::NoMatches,
            passages: vec![],
        };
        assert!(outcome.is_degraded());
        assert!(outcome.is_empty());
        assert_eq!(outcome.degraded_reason(), Some(&DegradedReason::NoMatches));
    }

    fn passage(text: &str, score: f32) -> RetrievalMatch {
        RetrievalMatch {
            dialogue_text: text.to_string(),
            episode_metadata: EpisodeMetadata {
                season: Some(4),
                episode: Some(11),
                character: Some("GEORGE".to_string()),
            },
            relevance_score: score,
            context: None,
        }
    }

    #[test]
    fn test_markdown_lists_matches_with_metadata() {
        let query = RetrievalQuery::new("George complaining about his job", 3);
        let outcome = RetrievalOutcome::Matches(vec![
            passage("I'm the boss of nothing!", 0.91),
            passage("I was in the pool!", 0.72),
        ]);

        let markdown = outcome.to_markdown(&query);
        assert!(markdown.starts_with("## Seinfeld Script Search Results\n"));
        assert!(markdown.contains("**Query:** George complaining about his job"));
        assert!(markdown.contains("**Found 2 relevant examples:**"));
        assert!(markdown.contains("**Episode:** Season 4, Episode 11"));
        assert!(markdown.contains("**Character:** GEORGE"));
        assert!(markdown.contains("**Relevance Score:** 0.9100"));
        assert_eq!(markdown.matches("---").count(), 2);
    }

    #[test]
    fn test_markdown_truncates_long_dialogue() {
        let query = RetrievalQuery::new("q", 1);
        let long = "a".repeat(MAX_RENDERED_DIALOGUE + 50);
        let outcome = RetrievalOutcome::Matches(vec![passage(&long, 0.5)]);

        let markdown = outcome.to_markdown(&query);
        let expected = format!("{}...", "a".repeat(MAX_RENDERED_DIALOGUE));
        assert!(markdown.contains(&expected));
        assert!(!markdown.contains(&"a".repeat(MAX_RENDERED_DIALOGUE + 1)));
    }

    #[test]
    fn test_markdown_marks_demo_mode() {
        let query = RetrievalQuery::new("q", 1);
        let outcome = RetrievalOutcome::Degraded {
            reason: DegradedReason::Forced,
            passages: vec![passage("JERRY: What's the deal?", 0.0)],
        };

        let markdown = outcome.to_markdown(&query);
        assert!(markdown.contains("(Demo Mode)"));
        assert!(markdown.contains("demo mode requested"));
        assert!(!markdown.contains("Relevance Score"));
    }
}
