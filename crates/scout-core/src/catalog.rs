//! The statistic catalog: unit class and aggregation kind for every known
//! statistic id.

use serde::{Deserialize, Serialize};

use crate::normalize::UnitClass;

/// How a statistic behaves across seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
  /// Summed across seasons.
  Counting,
  /// Per-game (or per-attempt) rate; undefined when no games were played.
  Rate,
  /// Part of the contract summary; never aggregated.
  Contract,
  Descriptive,
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatDef {
  pub id:    &'static str,
  pub unit:  UnitClass,
  pub kind:  StatKind,
  pub label: &'static str,
}

pub const GAMES_PLAYED: &str = "games_played";
pub const GOALS: &str = "goals";
pub const ASSISTS: &str = "assists";
pub const POINTS: &str = "points";
pub const PLUS_MINUS: &str = "plus_minus";
pub const PENALTY_MINUTES: &str = "penalty_minutes";
pub const SHOTS: &str = "shots";
pub const HITS: &str = "hits";
pub const BLOCKS: &str = "blocks";
pub const SHOOTING_PCT: &str = "shooting_pct";
pub const FACEOFF_PCT: &str = "faceoff_pct";
pub const CORSI_FOR_PCT: &str = "corsi_for_pct";
pub const TOI_PER_GAME: &str = "toi_per_game";
pub const WINS: &str = "wins";
pub const LOSSES: &str = "losses";
pub const SHUTOUTS: &str = "shutouts";
pub const SAVE_PCT: &str = "save_pct";
pub const GOALS_AGAINST_AVG: &str = "goals_against_avg";
pub const GOALS_SAVED_ABOVE_EXPECTED: &str = "goals_saved_above_expected";
pub const CAP_HIT: &str = "cap_hit";
pub const CONTRACT_TERM: &str = "contract_term";
pub const CONTRACT_STATUS: &str = "contract_status";

const fn def(id: &'static str, unit: UnitClass, kind: StatKind, label: &'static str) -> StatDef {
  StatDef { id, unit, kind, label }
}

/// Every known statistic, in display order.
pub const STATISTICS: &[StatDef] = &[
  def(GAMES_PLAYED, UnitClass::Count, StatKind::Counting, "Games played"),
  def(GOALS, UnitClass::Count, StatKind::Counting, "Goals"),
  def(ASSISTS, UnitClass::Count, StatKind::Counting, "Assists"),
  def(POINTS, UnitClass::Count, StatKind::Counting, "Points"),
  def(PLUS_MINUS, UnitClass::Count, StatKind::Counting, "Plus/minus"),
  def(PENALTY_MINUTES, UnitClass::Count, StatKind::Counting, "Penalty minutes"),
  def(SHOTS, UnitClass::Count, StatKind::Counting, "Shots"),
  def(HITS, UnitClass::Count, StatKind::Counting, "Hits"),
  def(BLOCKS, UnitClass::Count, StatKind::Counting, "Blocked shots"),
  def(SHOOTING_PCT, UnitClass::Percent, StatKind::Rate, "Shooting %"),
  def(FACEOFF_PCT, UnitClass::Percent, StatKind::Rate, "Faceoff %"),
  def(CORSI_FOR_PCT, UnitClass::Percent, StatKind::Rate, "Corsi for %"),
  def(TOI_PER_GAME, UnitClass::TimeOnIce, StatKind::Rate, "Time on ice per game"),
  def(WINS, UnitClass::Count, StatKind::Counting, "Wins"),
  def(LOSSES, UnitClass::Count, StatKind::Counting, "Losses"),
  def(SHUTOUTS, UnitClass::Count, StatKind::Counting, "Shutouts"),
  def(SAVE_PCT, UnitClass::SavePct, StatKind::Rate, "Save %"),
  def(GOALS_AGAINST_AVG, UnitClass::GoalRate, StatKind::Rate, "Goals against average"),
  def(
    GOALS_SAVED_ABOVE_EXPECTED,
    UnitClass::GoalRate,
    StatKind::Counting,
    "Goals saved above expected",
  ),
  def(CAP_HIT, UnitClass::Currency, StatKind::Contract, "Cap hit"),
  def(CONTRACT_TERM, UnitClass::Term, StatKind::Contract, "Contract term"),
  def(CONTRACT_STATUS, UnitClass::Text, StatKind::Contract, "Contract status"),
];

/// Look up a statistic by id.
pub fn lookup(id: &str) -> Option<&'static StatDef> {
  STATISTICS.iter().find(|def| def.id == id)
}

/// The aggregation kind of `id`; unknown statistics are descriptive.
pub fn kind_of(id: &str) -> StatKind {
  lookup(id).map_or(StatKind::Descriptive, |def| def.kind)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_are_unique() {
    let mut ids: Vec<_> = STATISTICS.iter().map(|d| d.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), STATISTICS.len());
  }

  #[test]
  fn lookup_finds_units() {
    assert_eq!(lookup(SAVE_PCT).map(|d| d.unit), Some(UnitClass::SavePct));
    assert_eq!(kind_of(TOI_PER_GAME), StatKind::Rate);
    assert_eq!(kind_of("mystery"), StatKind::Descriptive);
  }
}
