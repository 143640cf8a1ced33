//! `PostgreSQL` implementation of the `ArcRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use storyloom_core::arc::{Scope, StoryArc};
use storyloom_core::error::DomainError;
use storyloom_core::repository::{ArcFilter, ArcRepository};

use crate::error_map::map_db_error;

/// PostgreSQL-backed arc repository.
#[derive(Debug, Clone)]
pub struct PgArcRepository {
    pool: PgPool,
}

impl PgArcRepository {
    /// Creates a new `PgArcRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_arc(row: &PgRow) -> Result<StoryArc, DomainError> {
    let read = |e: sqlx::Error| DomainError::Infrastructure(format!("arc row decode: {e}"));
    Ok(StoryArc {
        id: row.try_get("id").map_err(read)?,
        name: row.try_get("name").map_err(read)?,
        world_id: row.try_get("world_id").map_err(read)?,
        dweller_id: row.try_get("dweller_id").map_err(read)?,
        story_ids: row.try_get::<Vec<Uuid>, _>("story_ids").map_err(read)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(read)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(read)?,
    })
}

const SELECT_COLUMNS: &str = "id, name, world_id, dweller_id, story_ids, created_at, updated_at";

#[async_trait]
impl ArcRepository for PgArcRepository {
    async fn get(&self, arc_id: Uuid) -> Result<Option<StoryArc>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM story_arcs WHERE id = $1"
        ))
        .bind(arc_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        row.as_ref().map(row_to_arc).transpose()
    }

    async fn find_by_story(&self, story_id: Uuid) -> Result<Option<StoryArc>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM story_arcs WHERE $1 = ANY(story_ids)"
        ))
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        row.as_ref().map(row_to_arc).transpose()
    }

    async fn list(&self, filter: &ArcFilter) -> Result<Vec<StoryArc>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM story_arcs
             WHERE ($1::uuid IS NULL OR world_id = $1)
               AND ($2::uuid IS NULL OR dweller_id = $2)
             ORDER BY updated_at DESC, id
             LIMIT $3 OFFSET $4"
        ))
        .bind(filter.world_id)
        .bind(filter.dweller_id)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        rows.iter().map(row_to_arc).collect()
    }

    async fn list_scope(&self, scope: &Scope) -> Result<Vec<StoryArc>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM story_arcs
             WHERE world_id = $1 AND dweller_id IS NOT DISTINCT FROM $2
             ORDER BY created_at, id"
        ))
        .bind(scope.world_id)
        .bind(scope.dweller_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        rows.iter().map(row_to_arc).collect()
    }

    async fn commit(&self, upserts: &[StoryArc], removals: &[Uuid]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        for arc in upserts {
            sqlx::query(
                "INSERT INTO story_arcs (id, name, world_id, dweller_id, story_ids, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (id) DO UPDATE
                 SET name = EXCLUDED.name,
                     story_ids = EXCLUDED.story_ids,
                     updated_at = EXCLUDED.updated_at",
            )
            .bind(arc.id)
            .bind(&arc.name)
            .bind(arc.world_id)
            .bind(arc.dweller_id)
            .bind(&arc.story_ids)
            .bind(arc.created_at)
            .bind(arc.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        if !removals.is_empty() {
            sqlx::query("DELETE FROM story_arcs WHERE id = ANY($1)")
                .bind(removals)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)
    }
}
