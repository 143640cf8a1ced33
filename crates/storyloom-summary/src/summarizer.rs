//! External summarizer abstraction.

use async_trait::async_trait;
use storyloom_core::arc::StoryArc;
use storyloom_core::error::DomainError;
use storyloom_core::story::Story;

/// A generated arc name and summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSummary {
    /// Short display name for the arc.
    pub name: String,
    /// Prose summary of the arc so far.
    pub summary: String,
}

/// The external LLM collaborator that writes arc names and summaries.
///
/// Implementations live outside this crate (an API client in
/// production). Callers must treat failures as non-fatal and degrade to
/// a deterministic fallback.
#[async_trait]
pub trait ArcSummarizer: Send + Sync {
    /// Generate a name and summary for the arc from its ordered stories.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::SummaryGenerationFailed`] (or an
    /// infrastructure error) when generation fails.
    async fn summarize(
        &self,
        arc: &StoryArc,
        stories: &[Story],
    ) -> Result<GeneratedSummary, DomainError>;
}
