//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `scout-store-sqlite`). The engine,
//! API and CLI depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  player::{NewPlayer, Player, Position},
  record::{NewSourceRecord, SourceRecord},
  report::EvaluationOutput,
  season::SeasonLabel,
};

/// Result of [`RecordStore::add_record`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
  Inserted(SourceRecord),
  /// A byte-identical record already existed; nothing was written.
  Duplicate(SourceRecord),
}

impl AddOutcome {
  pub fn record(&self) -> &SourceRecord {
    match self {
      Self::Inserted(r) | Self::Duplicate(r) => r,
    }
  }

  pub fn is_inserted(&self) -> bool { matches!(self, Self::Inserted(_)) }
}

/// Abstraction over a Scout record store backend.
///
/// Source records and evaluations are append-only: no method updates or
/// removes anything. Inserting the same record twice is a no-op.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Players ───────────────────────────────────────────────────────────

  /// Register a player. Fails if the id is already taken.
  fn add_player(
    &self,
    input: NewPlayer,
  ) -> impl Future<Output = Result<Player, Self::Error>> + Send + '_;

  /// Retrieve a player by id. Returns `None` if not found.
  fn get_player<'a>(
    &'a self,
    player_id: &'a str,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + 'a;

  /// List players ordered by id, optionally filtered by position.
  fn list_players(
    &self,
    position: Option<Position>,
  ) -> impl Future<Output = Result<Vec<Player>, Self::Error>> + Send + '_;

  // ── Records — append-only ─────────────────────────────────────────────

  /// Append a source record. Fails if the player does not exist.
  fn add_record(
    &self,
    input: NewSourceRecord,
  ) -> impl Future<Output = Result<AddOutcome, Self::Error>> + Send + '_;

  /// Records for one statistic and season, in insertion order.
  fn records_for<'a>(
    &'a self,
    player_id: &'a str,
    statistic_id: &'a str,
    season_label: SeasonLabel,
  ) -> impl Future<Output = Result<Vec<SourceRecord>, Self::Error>> + Send + 'a;

  /// Every record for a player, in insertion order.
  fn snapshot<'a>(
    &'a self,
    player_id: &'a str,
  ) -> impl Future<Output = Result<Vec<SourceRecord>, Self::Error>> + Send + 'a;

  // ── Evaluation history — append-only ──────────────────────────────────

  fn record_evaluation<'a>(
    &'a self,
    output: &'a EvaluationOutput,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Past evaluations for a player, oldest first.
  fn evaluations<'a>(
    &'a self,
    player_id: &'a str,
  ) -> impl Future<Output = Result<Vec<EvaluationOutput>, Self::Error>> + Send + 'a;
}
