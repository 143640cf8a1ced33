//! Storyloom — Arc Summarization bounded context.
//!
//! Generates and caches a short name and prose summary per arc via an
//! external LLM collaborator. Deliberately decoupled from the clustering
//! write path: detection never waits on this stage. Idempotent against
//! an unchanged story set, and degrades to a deterministic fallback name
//! when generation fails.

pub mod fingerprint;
pub mod service;
pub mod state;
pub mod summarizer;

pub use fingerprint::story_set_fingerprint;
pub use service::SummaryService;
pub use state::{SummaryState, summary_state};
pub use summarizer::{ArcSummarizer, GeneratedSummary};
