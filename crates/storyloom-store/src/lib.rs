//! Storyloom — PostgreSQL persistence.
//!
//! sqlx implementations of the core repository traits. Arc member lists
//! are stored as `UUID[]`, embedding vectors as `REAL[]`. Foreign-key
//! violations (a write against a dangling world or dweller) are rejected
//! outright with no partial write.

mod error_map;
pub mod pg_arc_repository;
pub mod pg_story_repository;
pub mod pg_summary_repository;

pub use pg_arc_repository::PgArcRepository;
pub use pg_story_repository::PgStoryRepository;
pub use pg_summary_repository::PgSummaryRepository;
