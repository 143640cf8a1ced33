//! Storyloom — Arc Signals bounded context.
//!
//! Live momentum/health signals derived from an arc's story timestamps,
//! and the "open threads" selection consumed by agent decision-making.
//! Everything here is a pure function of its inputs; no I/O.

pub mod context;
pub mod engine;

pub use context::{ArcContext, ContextConfig, OpenThread, open_threads};
pub use engine::{ArcSignal, Momentum, SignalConfig, compute_signal};
