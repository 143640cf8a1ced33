//! Similarity graph construction.
//!
//! Computes the qualifying edges between a new story and the dweller's
//! recent story history. An edge exists only when BOTH hold:
//! cosine similarity strictly above the threshold AND story timestamps
//! strictly closer than the window. Cost is bounded by the window size,
//! never the full corpus.

use storyloom_core::story::Story;
use uuid::Uuid;

use crate::config::DetectionConfig;

/// A qualifying edge from the story under detection to a prior story.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityEdge {
    /// The matched prior story.
    pub story_id: Uuid,
    /// Cosine similarity of the two embeddings.
    pub similarity: f64,
}

/// Cosine similarity of two vectors, accumulated in f64.
///
/// Returns `None` on dimension mismatch, empty input, or a zero-norm
/// vector, all of which mean "no meaningful similarity" rather than 0.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(dot / denom)
}

/// Builds the qualifying edge set for one story against its candidates.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityGraphBuilder<'a> {
    config: &'a DetectionConfig,
}

impl<'a> SimilarityGraphBuilder<'a> {
    /// Creates a builder over the given configuration.
    #[must_use]
    pub fn new(config: &'a DetectionConfig) -> Self {
        Self { config }
    }

    /// Edges from `story` to every candidate satisfying both the
    /// similarity and the temporal condition.
    ///
    /// Candidates from other dwellers, candidates without embeddings,
    /// and the story itself are skipped.
    #[must_use]
    pub fn edges(&self, story: &Story, candidates: &[Story]) -> Vec<SimilarityEdge> {
        let Some(vector) = story.vector() else {
            return Vec::new();
        };

        candidates
            .iter()
            .filter(|candidate| {
                candidate.id != story.id && candidate.dweller_id == story.dweller_id
            })
            .filter(|candidate| {
                let delta = (candidate.created_at - story.created_at).abs();
                delta < self.config.window
            })
            .filter_map(|candidate| {
                let similarity = cosine_similarity(vector, candidate.vector()?)?;
                (similarity > self.config.similarity_threshold).then_some(SimilarityEdge {
                    story_id: candidate.id,
                    similarity,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use storyloom_core::story::StoryEmbedding;
    use storyloom_test_support::unit_vec;

    fn story_at(dweller_id: Uuid, day: i64, vector: Vec<f32>) -> Story {
        let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::days(day);
        let id = Uuid::new_v4();
        Story {
            id,
            world_id: Uuid::nil(),
            dweller_id,
            title: "a story".to_owned(),
            content: "once upon a time".to_owned(),
            embedding: Some(StoryEmbedding {
                story_id: id,
                vector,
                created_at,
            }),
            created_at,
        }
    }

    #[test]
    fn test_cosine_of_identical_vectors_is_one() {
        let v = unit_vec(30.0);
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_rejects_dimension_mismatch_and_zero_norm() {
        assert!(cosine_similarity(&[1.0, 0.0], &[1.0]).is_none());
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).is_none());
        assert!(cosine_similarity(&[], &[]).is_none());
    }

    #[test]
    fn test_edge_requires_both_similarity_and_proximity() {
        let dweller = Uuid::new_v4();
        let config = DetectionConfig::default();
        let builder = SimilarityGraphBuilder::new(&config);

        let new_story = story_at(dweller, 10, unit_vec(0.0));
        // Similar (cos 20° ≈ 0.94) and close: qualifies.
        let close_similar = story_at(dweller, 6, unit_vec(20.0));
        // Similar but 8 days away: thematic echo, no edge.
        let far_similar = story_at(dweller, 2, unit_vec(20.0));
        // Close but dissimilar (cos 60° = 0.5): no edge.
        let close_dissimilar = story_at(dweller, 9, unit_vec(60.0));

        let edges = builder.edges(
            &new_story,
            &[close_similar.clone(), far_similar, close_dissimilar],
        );

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].story_id, close_similar.id);
        assert!(edges[0].similarity > 0.9);
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let dweller = Uuid::new_v4();
        let config = DetectionConfig::default();
        let builder = SimilarityGraphBuilder::new(&config);

        let new_story = story_at(dweller, 7, unit_vec(0.0));
        // Exactly 7 days apart: |Δt| < 7d fails.
        let boundary = story_at(dweller, 0, unit_vec(0.0));

        assert!(builder.edges(&new_story, &[boundary]).is_empty());
    }

    #[test]
    fn test_other_dweller_and_unembedded_candidates_are_skipped() {
        let dweller = Uuid::new_v4();
        let config = DetectionConfig::default();
        let builder = SimilarityGraphBuilder::new(&config);

        let new_story = story_at(dweller, 1, unit_vec(0.0));
        let other_dweller = story_at(Uuid::new_v4(), 1, unit_vec(0.0));
        let mut unembedded = story_at(dweller, 1, unit_vec(0.0));
        unembedded.embedding = None;

        assert!(builder.edges(&new_story, &[other_dweller, unembedded]).is_empty());
    }
}
