//! Repository abstractions over the story and arc stores.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::arc::{Scope, StoryArc};
use crate::error::DomainError;
use crate::story::{Story, StoryEmbedding};

/// Filter for arc listing queries.
#[derive(Debug, Clone, Copy)]
pub struct ArcFilter {
    /// Restrict to one world.
    pub world_id: Option<Uuid>,
    /// Restrict to one dweller.
    pub dweller_id: Option<Uuid>,
    /// Maximum number of rows returned.
    pub limit: i64,
    /// Number of rows skipped.
    pub offset: i64,
}

impl Default for ArcFilter {
    fn default() -> Self {
        Self {
            world_id: None,
            dweller_id: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Repository for arc rows.
///
/// Mutations go through [`ArcRepository::commit`] so a bridging merge
/// (upsert the surviving arc, remove the absorbed ones) is a single
/// atomic write with no partial state.
#[async_trait]
pub trait ArcRepository: Send + Sync {
    /// Load one arc by id.
    async fn get(&self, arc_id: Uuid) -> Result<Option<StoryArc>, DomainError>;

    /// Find the arc that contains the given story, if any.
    async fn find_by_story(&self, story_id: Uuid) -> Result<Option<StoryArc>, DomainError>;

    /// List arcs matching the filter, most recently updated first.
    async fn list(&self, filter: &ArcFilter) -> Result<Vec<StoryArc>, DomainError>;

    /// All arcs in one clustering scope.
    async fn list_scope(&self, scope: &Scope) -> Result<Vec<StoryArc>, DomainError>;

    /// Atomically upsert and remove arc rows.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ReferentialIntegrity`] when an upsert
    /// references a missing world or dweller; nothing is written.
    async fn commit(&self, upserts: &[StoryArc], removals: &[Uuid]) -> Result<(), DomainError>;
}

/// Repository for story rows and their embeddings.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Load one story by id.
    async fn get(&self, story_id: Uuid) -> Result<Option<Story>, DomainError>;

    /// Load several stories by id. Missing ids are silently skipped.
    async fn get_many(&self, story_ids: &[Uuid]) -> Result<Vec<Story>, DomainError>;

    /// Same-dweller stories with `|created_at - pivot| < window`,
    /// excluding the pivot story itself, chronological ascending.
    async fn window(
        &self,
        world_id: Uuid,
        dweller_id: Uuid,
        pivot_story_id: Uuid,
        pivot: DateTime<Utc>,
        window: Duration,
    ) -> Result<Vec<Story>, DomainError>;

    /// All stories matching the optional world/dweller filter,
    /// chronological ascending. Used by the batch detection sweep.
    async fn list(
        &self,
        world_id: Option<Uuid>,
        dweller_id: Option<Uuid>,
    ) -> Result<Vec<Story>, DomainError>;

    /// Stories with no stored vector yet, oldest first. The backfill
    /// pipeline drains this queue through
    /// [`StoryRepository::set_embedding`].
    async fn unembedded(&self, limit: i64) -> Result<Vec<Story>, DomainError>;

    /// Attach a freshly computed embedding to its story.
    async fn set_embedding(&self, embedding: &StoryEmbedding) -> Result<(), DomainError>;
}
