//! Storyloom Core — shared domain abstractions.
//!
//! This crate defines the fundamental types and traits that all other
//! Storyloom crates depend on: the story and arc models, the error
//! taxonomy, the clock abstraction, and the repository/provider traits.
//! It contains no infrastructure code.

pub mod arc;
pub mod clock;
pub mod embedding;
pub mod error;
pub mod repository;
pub mod story;
pub mod summary;
