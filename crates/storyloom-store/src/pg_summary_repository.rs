//! `PostgreSQL` implementation of the `SummaryRepository` trait.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use storyloom_core::error::DomainError;
use storyloom_core::summary::{ArcSummaryRecord, SummaryRepository};

use crate::error_map::map_db_error;

/// PostgreSQL-backed summary cache.
#[derive(Debug, Clone)]
pub struct PgSummaryRepository {
    pool: PgPool,
}

impl PgSummaryRepository {
    /// Creates a new `PgSummaryRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryRepository for PgSummaryRepository {
    async fn get(&self, arc_id: Uuid) -> Result<Option<ArcSummaryRecord>, DomainError> {
        let row = sqlx::query(
            "SELECT arc_id, name, summary, fingerprint, generated_at
             FROM arc_summaries WHERE arc_id = $1",
        )
        .bind(arc_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(|row| {
            let read =
                |e: sqlx::Error| DomainError::Infrastructure(format!("summary row decode: {e}"));
            Ok(ArcSummaryRecord {
                arc_id: row.try_get("arc_id").map_err(read)?,
                name: row.try_get("name").map_err(read)?,
                summary: row.try_get("summary").map_err(read)?,
                fingerprint: row.try_get("fingerprint").map_err(read)?,
                generated_at: row.try_get("generated_at").map_err(read)?,
            })
        })
        .transpose()
    }

    async fn put(&self, record: &ArcSummaryRecord) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO arc_summaries (arc_id, name, summary, fingerprint, generated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (arc_id) DO UPDATE
             SET name = EXCLUDED.name,
                 summary = EXCLUDED.summary,
                 fingerprint = EXCLUDED.fingerprint,
                 generated_at = EXCLUDED.generated_at",
        )
        .bind(record.arc_id)
        .bind(&record.name)
        .bind(&record.summary)
        .bind(&record.fingerprint)
        .bind(record.generated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(())
    }
}
