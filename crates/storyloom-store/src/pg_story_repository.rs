//! `PostgreSQL` implementation of the `StoryRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use storyloom_core::error::DomainError;
use storyloom_core::repository::StoryRepository;
use storyloom_core::story::{Story, StoryEmbedding};

use crate::error_map::map_db_error;

/// PostgreSQL-backed story repository.
#[derive(Debug, Clone)]
pub struct PgStoryRepository {
    pool: PgPool,
}

impl PgStoryRepository {
    /// Creates a new `PgStoryRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a story row. Embeddings arrive later via
    /// [`StoryRepository::set_embedding`].
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ReferentialIntegrity`] when the story
    /// references a missing world or dweller.
    pub async fn insert(&self, story: &Story) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO stories (id, world_id, dweller_id, title, content, embedding, embedded_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(story.id)
        .bind(story.world_id)
        .bind(story.dweller_id)
        .bind(&story.title)
        .bind(&story.content)
        .bind(story.embedding.as_ref().map(|e| e.vector.clone()))
        .bind(story.embedding.as_ref().map(|e| e.created_at))
        .bind(story.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(())
    }
}

fn row_to_story(row: &PgRow) -> Result<Story, DomainError> {
    let read = |e: sqlx::Error| DomainError::Infrastructure(format!("story row decode: {e}"));
    let id: Uuid = row.try_get("id").map_err(read)?;
    let vector: Option<Vec<f32>> = row.try_get("embedding").map_err(read)?;
    let embedded_at: Option<DateTime<Utc>> = row.try_get("embedded_at").map_err(read)?;
    let embedding = match (vector, embedded_at) {
        (Some(vector), Some(created_at)) => Some(StoryEmbedding {
            story_id: id,
            vector,
            created_at,
        }),
        _ => None,
    };
    Ok(Story {
        id,
        world_id: row.try_get("world_id").map_err(read)?,
        dweller_id: row.try_get("dweller_id").map_err(read)?,
        title: row.try_get("title").map_err(read)?,
        content: row.try_get("content").map_err(read)?,
        embedding,
        created_at: row.try_get("created_at").map_err(read)?,
    })
}

const SELECT_COLUMNS: &str =
    "id, world_id, dweller_id, title, content, embedding, embedded_at, created_at";

#[async_trait]
impl StoryRepository for PgStoryRepository {
    async fn get(&self, story_id: Uuid) -> Result<Option<Story>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM stories WHERE id = $1"
        ))
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        row.as_ref().map(row_to_story).transpose()
    }

    async fn get_many(&self, story_ids: &[Uuid]) -> Result<Vec<Story>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM stories WHERE id = ANY($1) ORDER BY created_at, id"
        ))
        .bind(story_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        rows.iter().map(row_to_story).collect()
    }

    async fn window(
        &self,
        world_id: Uuid,
        dweller_id: Uuid,
        pivot_story_id: Uuid,
        pivot: DateTime<Utc>,
        window: Duration,
    ) -> Result<Vec<Story>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM stories
             WHERE world_id = $1 AND dweller_id = $2 AND id <> $3
               AND created_at > $4 AND created_at < $5
             ORDER BY created_at, id"
        ))
        .bind(world_id)
        .bind(dweller_id)
        .bind(pivot_story_id)
        .bind(pivot - window)
        .bind(pivot + window)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        rows.iter().map(row_to_story).collect()
    }

    async fn list(
        &self,
        world_id: Option<Uuid>,
        dweller_id: Option<Uuid>,
    ) -> Result<Vec<Story>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM stories
             WHERE ($1::uuid IS NULL OR world_id = $1)
               AND ($2::uuid IS NULL OR dweller_id = $2)
             ORDER BY created_at, id"
        ))
        .bind(world_id)
        .bind(dweller_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        rows.iter().map(row_to_story).collect()
    }

    async fn unembedded(&self, limit: i64) -> Result<Vec<Story>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM stories
             WHERE embedding IS NULL
             ORDER BY created_at, id
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        rows.iter().map(row_to_story).collect()
    }

    async fn set_embedding(&self, embedding: &StoryEmbedding) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE stories SET embedding = $2, embedded_at = $3 WHERE id = $1",
        )
        .bind(embedding.story_id)
        .bind(&embedding.vector)
        .bind(embedding.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(embedding.story_id));
        }
        Ok(())
    }
}
