//! Error types for `scout-core`.

use thiserror::Error;

use crate::normalize::FormatError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid season label: {0:?}")]
  InvalidSeason(String),

  #[error("source tier must be between 1 and 5, got {0}")]
  InvalidTier(u8),

  #[error("rating must be between 1 and 9, got {0}")]
  RatingOutOfRange(u8),

  #[error("confidence must be between 0 and 100, got {0}")]
  ConfidenceOutOfRange(u8),

  #[error("invalid fixed-point decimal: {0:?}")]
  InvalidDecimal(String),

  #[error(transparent)]
  Format(#[from] FormatError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
