//! The Scout reconciliation and rating engine.
//!
//! Each stage is a pure function over the previous stage's output:
//!
//! 1. [`resolve`] — source records to canonical facts, one per key;
//! 2. [`table`] — canonical facts to season rows and the contract summary;
//! 3. [`rating`] and [`confidence`] — the profile to ratings with confidence.
//!
//! [`ingest`] gathers records from providers concurrently, and [`evaluate`]
//! wires the stages together against one store snapshot.

pub mod benchmark;
pub mod config;
pub mod confidence;
pub mod error;
pub mod evaluate;
pub mod ingest;
pub mod rating;
pub mod resolve;
pub mod table;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use evaluate::Evaluator;

/// Version stamped into every evaluation output.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests;
