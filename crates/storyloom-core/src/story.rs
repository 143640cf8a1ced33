//! Story model: the unit of narrative a dweller tells.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fixed-length embedding vector computed for a story's text.
///
/// Immutable once computed; a story edit does not silently replace it
/// (see the detection crate for the re-embed policy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryEmbedding {
    /// The story this vector was computed for.
    pub story_id: Uuid,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// When the vector was computed.
    pub created_at: DateTime<Utc>,
}

/// A story told from one dweller's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    /// Story identifier.
    pub id: Uuid,
    /// World the story belongs to.
    pub world_id: Uuid,
    /// Dweller whose perspective anchors the story.
    pub dweller_id: Uuid,
    /// Short title.
    pub title: String,
    /// Full narrative text.
    pub content: String,
    /// Embedding vector, nullable until backfilled.
    pub embedding: Option<StoryEmbedding>,
    /// When the story was created.
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Returns the embedding vector if one has been computed.
    #[must_use]
    pub fn vector(&self) -> Option<&[f32]> {
        self.embedding.as_ref().map(|e| e.vector.as_slice())
    }
}
