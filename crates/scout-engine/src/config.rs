//! Engine configuration.
//!
//! Deserialised from the `[engine]` table of the binary's settings. Every
//! field has a default, so an empty table is a valid configuration.

use std::{collections::HashMap, time::Duration};

use chrono::{Datelike, Utc};
use scout_core::{player::Position, season::Season};
use serde::Deserialize;

use crate::benchmark::{self, Cutoffs};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// The season currently being played; columns for it are marked to-date.
  pub current_season:        Season,
  /// How many seasons the most recent record may lag `current_season`
  /// before it counts as stale.
  pub freshness_seasons:     u16,
  /// League precedence, highest first. Unlisted leagues rank after these,
  /// alphabetically.
  pub league_priority:       Vec<String>,
  /// Minimum fraction of rating metrics that must be present; below it
  /// confidence is capped.
  pub min_coverage:          f64,
  pub provider_timeout_secs: u64,
  /// Benchmark overrides keyed `"<position>.<metric>"`, e.g.
  /// `"forward.points_per_game"`.
  pub benchmarks:            HashMap<String, Cutoffs>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      current_season:        season_in_progress(),
      freshness_seasons:     1,
      league_priority:       [
        "NHL", "KHL", "SHL", "Liiga", "NL", "DEL", "AHL", "ECHL", "OHL", "WHL", "QMJHL", "NCAA",
        "USHL",
      ]
      .into_iter()
      .map(str::to_owned)
      .collect(),
      min_coverage:          0.5,
      provider_timeout_secs: 20,
      benchmarks:            HashMap::new(),
    }
  }
}

impl EngineConfig {
  /// Sort key for a league: configured leagues by position, then the rest
  /// alphabetically (case-insensitive).
  pub fn league_rank(&self, league: &str) -> (usize, String) {
    let position = self
      .league_priority
      .iter()
      .position(|l| l.eq_ignore_ascii_case(league))
      .unwrap_or(self.league_priority.len());
    (position, league.to_ascii_lowercase())
  }

  pub fn provider_timeout(&self) -> Duration { Duration::from_secs(self.provider_timeout_secs) }

  /// Benchmark cutoffs for a metric, honouring overrides.
  pub fn cutoffs(&self, position: Position, metric: &str) -> Option<Cutoffs> {
    self
      .benchmarks
      .get(&format!("{position}.{metric}"))
      .copied()
      .or_else(|| benchmark::default_cutoffs(position, metric))
  }
}

/// The season in progress today: seasons start in September.
fn season_in_progress() -> Season {
  let today = Utc::now().date_naive();
  let year = u16::try_from(today.year()).unwrap_or(2000);
  if today.month() >= 9 { Season::new(year) } else { Season::new(year - 1) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn league_rank_orders_known_then_alphabetical() {
    let config = EngineConfig::default();
    let mut leagues = vec!["Mestis", "AHL", "nhl", "Allsvenskan"];
    leagues.sort_by_key(|l| config.league_rank(l));
    assert_eq!(leagues, vec!["nhl", "AHL", "Allsvenskan", "Mestis"]);
  }

  #[test]
  fn empty_table_deserializes_to_defaults() {
    let config: EngineConfig = serde_json::from_str(r#"{ "current_season": "2024-25" }"#).unwrap();
    assert_eq!(config.current_season, Season::new(2024));
    assert_eq!(config.freshness_seasons, 1);
    assert!(config.cutoffs(Position::Goalie, "save_pct").is_some());
  }

  #[test]
  fn benchmark_overrides_win() {
    let mut config = EngineConfig::default();
    let custom = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    config.benchmarks.insert("forward.points_per_game".into(), custom);
    assert_eq!(config.cutoffs(Position::Forward, "points_per_game"), Some(custom));
  }
}
