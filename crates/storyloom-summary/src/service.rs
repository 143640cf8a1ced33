//! Summary refresh service.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use storyloom_core::arc::{StoryArc, fallback_arc_name};
use storyloom_core::clock::Clock;
use storyloom_core::error::DomainError;
use storyloom_core::story::Story;
use storyloom_core::summary::{ArcSummaryRecord, SummaryRepository};

use crate::fingerprint::story_set_fingerprint;
use crate::state::{SummaryState, summary_state};
use crate::summarizer::ArcSummarizer;

/// Generates, caches, and refreshes arc summaries.
///
/// Independent, retryable pipeline stage: detection latency never
/// depends on this service.
pub struct SummaryService {
    summarizer: Arc<dyn ArcSummarizer>,
    repository: Arc<dyn SummaryRepository>,
    clock: Arc<dyn Clock>,
}

impl SummaryService {
    /// Creates the service over its collaborators.
    #[must_use]
    pub fn new(
        summarizer: Arc<dyn ArcSummarizer>,
        repository: Arc<dyn SummaryRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            summarizer,
            repository,
            clock,
        }
    }

    /// Current lifecycle state of the arc's summary.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub async fn state_of(&self, arc: &StoryArc) -> Result<SummaryState, DomainError> {
        let fingerprint = story_set_fingerprint(&arc.story_ids);
        let record = self.repository.get(arc.id).await?;
        Ok(summary_state(record.as_ref(), &fingerprint))
    }

    /// Ensures the arc has a summary covering its current story set.
    ///
    /// Cache hit on an unchanged story set returns the stored record
    /// without invoking the summarizer. On generation failure the
    /// returned record carries the deterministic fallback name and is
    /// NOT persisted, so the next refresh retries generation.
    ///
    /// # Errors
    ///
    /// Propagates repository errors; summarizer failures degrade instead
    /// of propagating.
    #[instrument(skip(self, arc, stories), fields(arc_id = %arc.id))]
    pub async fn refresh(
        &self,
        arc: &StoryArc,
        stories: &[Story],
    ) -> Result<ArcSummaryRecord, DomainError> {
        let fingerprint = story_set_fingerprint(&arc.story_ids);
        let existing = self.repository.get(arc.id).await?;
        if let Some(record) = &existing {
            if record.fingerprint == fingerprint {
                return Ok(record.clone());
            }
        }

        match self.summarizer.summarize(arc, stories).await {
            Ok(generated) => {
                let record = ArcSummaryRecord {
                    arc_id: arc.id,
                    name: generated.name,
                    summary: generated.summary,
                    fingerprint,
                    generated_at: self.clock.now(),
                };
                self.repository.put(&record).await?;
                info!("arc summary regenerated");
                Ok(record)
            }
            Err(error) => {
                warn!(%error, "summarizer failed; using fallback name");
                let fallback_title = stories.first().map_or("", |story| story.title.as_str());
                Ok(ArcSummaryRecord {
                    arc_id: arc.id,
                    name: fallback_arc_name(fallback_title),
                    summary: existing.map(|r| r.summary).unwrap_or_default(),
                    // Not the current fingerprint: the summary stays
                    // stale and the next refresh retries generation.
                    fingerprint: String::new(),
                    generated_at: self.clock.now(),
                })
            }
        }
    }
}
