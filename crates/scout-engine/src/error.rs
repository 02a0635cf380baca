//! Error types for `scout-engine`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Fatal for a run: nothing usable exists for the player. Distinct from a
  /// low-confidence rating.
  #[error("no usable records for player {0}")]
  NoUsableRecords(String),

  #[error("player not found: {0}")]
  PlayerNotFound(String),

  #[error(transparent)]
  Core(#[from] scout_core::Error),

  #[error("store error: {0}")]
  Store(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
