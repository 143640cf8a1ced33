//! Storyloom API — axum HTTP surface over arc detection and signals.

pub mod error;
pub mod routes;
pub mod state;
