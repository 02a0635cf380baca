//! Error type for `scout-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] scout_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value the domain types reject.
  #[error("corrupt column {column}: {value:?}")]
  Decode { column: &'static str, value: String },

  #[error("player not found: {0}")]
  PlayerNotFound(String),

  #[error("player already exists: {0}")]
  PlayerExists(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
