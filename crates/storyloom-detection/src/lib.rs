//! Storyloom — Arc Detection bounded context.
//!
//! Groups a dweller's stories into continuing arcs using semantic
//! similarity plus temporal proximity. The pipeline per new story:
//! embed → build qualifying similarity edges against the recent window →
//! incremental union-find assignment/merge → persist.
//!
//! Clustering state is rebuilt from persisted arc rows on every call, so
//! detection is restartable, idempotent, and testable in isolation.

pub mod clusterer;
pub mod config;
pub mod detector;
pub mod similarity;
pub mod union_find;

pub use clusterer::{DetectionOutcome, DetectionPlan, ScopeSnapshot, StoryMeta};
pub use config::DetectionConfig;
pub use detector::{ArcDetector, SweepFailure, SweepReport};
pub use similarity::SimilarityEdge;
