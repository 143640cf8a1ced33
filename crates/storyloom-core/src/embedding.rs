//! Embedding provider abstraction.
//!
//! The actual model lives behind an external service; detection only
//! depends on this trait. Provider failures must never block story
//! creation — they surface as [`DomainError::EmbeddingUnavailable`] and
//! the story stays unclustered until the next sweep retries it.

use async_trait::async_trait;

use crate::error::DomainError;

/// Turns story text into a fixed-length float vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Dimensionality of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// Embed the given text.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmbeddingUnavailable`] wrapped by callers
    /// when the provider is down; implementations may also return
    /// [`DomainError::Infrastructure`] for transport failures.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;
}

/// Provider for deployments where vectors are backfilled by an external
/// pipeline: inline embedding always reports unavailable, leaving the
/// story unclustered until the pipeline writes its vector and the next
/// sweep picks it up.
#[derive(Debug, Clone, Copy)]
pub struct DeferredEmbeddingProvider {
    dimension: usize,
}

impl DeferredEmbeddingProvider {
    /// Creates a provider declaring the pipeline's dimensionality.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for DeferredEmbeddingProvider {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
        Err(DomainError::Infrastructure(
            "inline embedding is disabled; vectors arrive via the backfill pipeline".to_owned(),
        ))
    }
}
