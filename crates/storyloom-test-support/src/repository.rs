//! In-memory repository implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use storyloom_core::arc::{Scope, StoryArc};
use storyloom_core::error::DomainError;
use storyloom_core::repository::{ArcFilter, ArcRepository, StoryRepository};
use storyloom_core::story::{Story, StoryEmbedding};
use storyloom_core::summary::{ArcSummaryRecord, SummaryRepository};
use uuid::Uuid;

/// In-memory `ArcRepository` backed by a `HashMap`.
#[derive(Default)]
pub struct InMemoryArcRepository {
    arcs: Mutex<HashMap<Uuid, StoryArc>>,
}

impl InMemoryArcRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored arc, unordered.
    #[must_use]
    pub fn all(&self) -> Vec<StoryArc> {
        self.arcs
            .lock()
            .expect("arc fixture lock poisoned")
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ArcRepository for InMemoryArcRepository {
    async fn get(&self, arc_id: Uuid) -> Result<Option<StoryArc>, DomainError> {
        Ok(self
            .arcs
            .lock()
            .expect("arc fixture lock poisoned")
            .get(&arc_id)
            .cloned())
    }

    async fn find_by_story(&self, story_id: Uuid) -> Result<Option<StoryArc>, DomainError> {
        Ok(self
            .arcs
            .lock()
            .expect("arc fixture lock poisoned")
            .values()
            .find(|arc| arc.contains(story_id))
            .cloned())
    }

    async fn list(&self, filter: &ArcFilter) -> Result<Vec<StoryArc>, DomainError> {
        let mut arcs: Vec<StoryArc> = self
            .arcs
            .lock()
            .expect("arc fixture lock poisoned")
            .values()
            .filter(|arc| filter.world_id.is_none_or(|w| arc.world_id == w))
            .filter(|arc| filter.dweller_id.is_none_or(|d| arc.dweller_id == Some(d)))
            .cloned()
            .collect();
        arcs.sort_by_key(|arc| std::cmp::Reverse((arc.updated_at, arc.id)));
        let offset = usize::try_from(filter.offset).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);
        Ok(arcs.into_iter().skip(offset).take(limit).collect())
    }

    async fn list_scope(&self, scope: &Scope) -> Result<Vec<StoryArc>, DomainError> {
        let mut arcs: Vec<StoryArc> = self
            .arcs
            .lock()
            .expect("arc fixture lock poisoned")
            .values()
            .filter(|arc| arc.scope() == *scope)
            .cloned()
            .collect();
        arcs.sort_by_key(|arc| (arc.created_at, arc.id));
        Ok(arcs)
    }

    async fn commit(&self, upserts: &[StoryArc], removals: &[Uuid]) -> Result<(), DomainError> {
        let mut arcs = self.arcs.lock().expect("arc fixture lock poisoned");
        for arc in upserts {
            arcs.insert(arc.id, arc.clone());
        }
        for arc_id in removals {
            arcs.remove(arc_id);
        }
        Ok(())
    }
}

/// `ArcRepository` whose writes always fail with a referential
/// integrity violation, for exercising rejection paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingArcRepository;

#[async_trait]
impl ArcRepository for FailingArcRepository {
    async fn get(&self, _arc_id: Uuid) -> Result<Option<StoryArc>, DomainError> {
        Ok(None)
    }

    async fn find_by_story(&self, _story_id: Uuid) -> Result<Option<StoryArc>, DomainError> {
        Ok(None)
    }

    async fn list(&self, _filter: &ArcFilter) -> Result<Vec<StoryArc>, DomainError> {
        Ok(Vec::new())
    }

    async fn list_scope(&self, _scope: &Scope) -> Result<Vec<StoryArc>, DomainError> {
        Ok(Vec::new())
    }

    async fn commit(&self, _upserts: &[StoryArc], _removals: &[Uuid]) -> Result<(), DomainError> {
        Err(DomainError::ReferentialIntegrity(
            "arc references a missing world or dweller".to_owned(),
        ))
    }
}

/// In-memory `StoryRepository` backed by a `HashMap`.
#[derive(Default)]
pub struct InMemoryStoryRepository {
    stories: Mutex<HashMap<Uuid, Story>>,
}

impl InMemoryStoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a story.
    pub fn insert(&self, story: Story) {
        self.stories
            .lock()
            .expect("story fixture lock poisoned")
            .insert(story.id, story);
    }
}

#[async_trait]
impl StoryRepository for InMemoryStoryRepository {
    async fn get(&self, story_id: Uuid) -> Result<Option<Story>, DomainError> {
        Ok(self
            .stories
            .lock()
            .expect("story fixture lock poisoned")
            .get(&story_id)
            .cloned())
    }

    async fn get_many(&self, story_ids: &[Uuid]) -> Result<Vec<Story>, DomainError> {
        let stories = self.stories.lock().expect("story fixture lock poisoned");
        Ok(story_ids
            .iter()
            .filter_map(|id| stories.get(id).cloned())
            .collect())
    }

    async fn window(
        &self,
        world_id: Uuid,
        dweller_id: Uuid,
        pivot_story_id: Uuid,
        pivot: DateTime<Utc>,
        window: Duration,
    ) -> Result<Vec<Story>, DomainError> {
        let mut stories: Vec<Story> = self
            .stories
            .lock()
            .expect("story fixture lock poisoned")
            .values()
            .filter(|story| {
                story.id != pivot_story_id
                    && story.world_id == world_id
                    && story.dweller_id == dweller_id
                    && (story.created_at - pivot).abs() < window
            })
            .cloned()
            .collect();
        stories.sort_by_key(|story| (story.created_at, story.id));
        Ok(stories)
    }

    async fn list(
        &self,
        world_id: Option<Uuid>,
        dweller_id: Option<Uuid>,
    ) -> Result<Vec<Story>, DomainError> {
        let mut stories: Vec<Story> = self
            .stories
            .lock()
            .expect("story fixture lock poisoned")
            .values()
            .filter(|story| world_id.is_none_or(|w| story.world_id == w))
            .filter(|story| dweller_id.is_none_or(|d| story.dweller_id == d))
            .cloned()
            .collect();
        stories.sort_by_key(|story| (story.created_at, story.id));
        Ok(stories)
    }

    async fn unembedded(&self, limit: i64) -> Result<Vec<Story>, DomainError> {
        let mut stories: Vec<Story> = self
            .stories
            .lock()
            .expect("story fixture lock poisoned")
            .values()
            .filter(|story| story.embedding.is_none())
            .cloned()
            .collect();
        stories.sort_by_key(|story| (story.created_at, story.id));
        stories.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(stories)
    }

    async fn set_embedding(&self, embedding: &StoryEmbedding) -> Result<(), DomainError> {
        let mut stories = self.stories.lock().expect("story fixture lock poisoned");
        let story = stories
            .get_mut(&embedding.story_id)
            .ok_or(DomainError::NotFound(embedding.story_id))?;
        story.embedding = Some(embedding.clone());
        Ok(())
    }
}

/// In-memory `SummaryRepository` backed by a `HashMap`.
#[derive(Default)]
pub struct InMemorySummaryRepository {
    records: Mutex<HashMap<Uuid, ArcSummaryRecord>>,
}

impl InMemorySummaryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SummaryRepository for InMemorySummaryRepository {
    async fn get(&self, arc_id: Uuid) -> Result<Option<ArcSummaryRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .expect("summary fixture lock poisoned")
            .get(&arc_id)
            .cloned())
    }

    async fn put(&self, record: &ArcSummaryRecord) -> Result<(), DomainError> {
        self.records
            .lock()
            .expect("summary fixture lock poisoned")
            .insert(record.arc_id, record.clone());
        Ok(())
    }
}
