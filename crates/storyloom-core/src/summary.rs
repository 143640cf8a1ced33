//! Cached arc summary record and its repository abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// The cached output of the summarizer for one arc.
///
/// `fingerprint` identifies the exact ordered story set the summary was
/// generated from; comparing it against the arc's current story set
/// drives the NEW → SUMMARIZED → STALE state machine without persisting
/// state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcSummaryRecord {
    /// The summarized arc.
    pub arc_id: Uuid,
    /// Generated display name.
    pub name: String,
    /// Generated prose summary.
    pub summary: String,
    /// Fingerprint of the ordered story ids the summary covers.
    pub fingerprint: String,
    /// When the summary was generated.
    pub generated_at: DateTime<Utc>,
}

/// Repository for cached arc summaries.
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    /// Load the cached summary for an arc, if any.
    async fn get(&self, arc_id: Uuid) -> Result<Option<ArcSummaryRecord>, DomainError>;

    /// Insert or replace the cached summary for an arc.
    async fn put(&self, record: &ArcSummaryRecord) -> Result<(), DomainError>;
}
