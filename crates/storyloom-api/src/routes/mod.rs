//! Route modules.

pub mod arcs;
pub mod dwellers;
pub mod health;
pub mod stories;

pub(crate) mod view;
