//! Embedding provider stubs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use storyloom_core::embedding::EmbeddingProvider;
use storyloom_core::error::DomainError;
use uuid::Uuid;

/// Provider that returns pre-registered vectors keyed by story text.
pub struct StaticEmbeddingProvider {
    dimension: usize,
    vectors: Mutex<HashMap<String, Vec<f32>>>,
}

impl StaticEmbeddingProvider {
    /// Creates an empty provider for the given dimensionality.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Mutex::new(HashMap::new()),
        }
    }

    /// Registers the vector returned for `text`.
    pub fn register(&self, text: &str, vector: Vec<f32>) {
        self.vectors
            .lock()
            .expect("embedding fixture lock poisoned")
            .insert(text.to_owned(), vector);
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbeddingProvider {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.vectors
            .lock()
            .expect("embedding fixture lock poisoned")
            .get(text)
            .cloned()
            .ok_or_else(|| DomainError::EmbeddingUnavailable(Uuid::nil()))
    }
}

/// Provider that always fails, for exercising the best-effort paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for FailingEmbeddingProvider {
    fn dimension(&self) -> usize {
        2
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
        Err(DomainError::Infrastructure(
            "embedding service unavailable".to_owned(),
        ))
    }
}
