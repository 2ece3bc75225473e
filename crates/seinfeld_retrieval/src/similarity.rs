//! Vector similarity and ranking helpers.

use seinfeld_core::RetrievalMatch;
use std::cmp::Ordering;

/// Cosine similarity of two equal-length vectors.
///
/// Zero vectors have similarity 0.0 with everything. Extra trailing
/// components of the longer vector are ignored.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Sort by descending relevance and keep the top `limit`.
///
/// The sort is stable, so equal scores keep backend order. NaN scores sort last.
pub fn rank_matches(mut matches: Vec<RetrievalMatch>, limit: usize) -> Vec<RetrievalMatch> {
    matches.sort_by(|a, b| match (a.relevance_score.is_nan(), b.relevance_score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b
            .relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal),
    });
    matches.truncate(limit);
    matches
}
