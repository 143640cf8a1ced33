//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The embedding provider failed or has not yet produced a vector for
    /// this story. Transient; the story stays unclustered until retried.
    #[error("embedding unavailable for story {0}")]
    EmbeddingUnavailable(Uuid),

    /// Two detections raced on the same (world, dweller) scope. The
    /// enclosing operation should be retried.
    #[error("concurrent clustering conflict: {0}")]
    ClusterConflict(String),

    /// The summarizer collaborator failed. Non-fatal; callers degrade to
    /// a deterministic fallback name.
    #[error("summary generation failed for arc {arc_id}: {reason}")]
    SummaryGenerationFailed {
        /// Arc whose summary could not be generated.
        arc_id: Uuid,
        /// Provider-reported reason.
        reason: String,
    },

    /// A write referenced a missing world or dweller. Rejected outright
    /// with no partial write.
    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// An entity was not found.
    #[error("not found: {0}")]
    NotFound(Uuid),

    /// A validation error in domain logic or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
