//! Shared test mocks and utilities for the Storyloom engine.

mod clock;
mod embedding;
mod repository;
mod vectors;

pub use clock::FixedClock;
pub use embedding::{FailingEmbeddingProvider, StaticEmbeddingProvider};
pub use repository::{
    FailingArcRepository, InMemoryArcRepository, InMemoryStoryRepository,
    InMemorySummaryRepository,
};
pub use vectors::unit_vec;
