//! The player profile: everything the rating engine reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  fact::CanonicalFact,
  player::Player,
  row::{Cell, SeasonRow},
  season::Season,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
  /// Affects the current rating (usage, deployment, role).
  Role,
  /// Affects the projection (development, injury recovery).
  Development,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
  Positive,
  Negative,
}

/// A bounded qualitative adjustment supplied alongside the numeric record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitativeSignal {
  pub kind:      SignalKind,
  pub direction: Direction,
  pub note:      String,
}

/// Cap hit, term and status, each resolved like any other fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSummary {
  pub cap_hit: Cell,
  pub term:    Cell,
  pub status:  Cell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
  pub player:      Player,
  pub contract:    ContractSummary,
  /// Every canonical fact, primary and league-qualified.
  pub facts:       Vec<CanonicalFact>,
  pub season_rows: BTreeMap<String, SeasonRow>,
  /// Seasons with at least one record, most recent first.
  pub seasons:     Vec<Season>,
  pub signals:     Vec<QualitativeSignal>,
}

impl PlayerProfile {
  pub fn row(&self, statistic_id: &str) -> Option<&SeasonRow> { self.season_rows.get(statistic_id) }

  pub fn most_recent_season(&self) -> Option<Season> { self.seasons.first().copied() }

  pub fn signals_of(&self, kind: SignalKind) -> impl Iterator<Item = &QualitativeSignal> {
    self.signals.iter().filter(move |s| s.kind == kind)
  }
}
