//! Rating dimensions and population benchmarks.
//!
//! Each position is rated on a fixed set of weighted metrics. A metric value
//! maps to a stanine through eight ascending cutoffs, modelled on the active
//! top-league population at roughly the 4/11/23/40/60/77/89/96th
//! percentiles.

use scout_core::{catalog, player::Position};

/// Eight ascending stanine boundaries.
pub type Cutoffs = [f64; 8];

/// Where a metric's value comes from in a season column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
  /// The statistic's own value.
  Direct(&'static str),
  /// A counting statistic divided by games played.
  PerGame(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDef {
  pub name:            &'static str,
  pub source:          MetricSource,
  pub weight:          u8,
  pub lower_is_better: bool,
}

const fn direct(name: &'static str, weight: u8) -> MetricDef {
  MetricDef { name, source: MetricSource::Direct(name), weight, lower_is_better: false }
}

const fn per_game(name: &'static str, stat: &'static str, weight: u8) -> MetricDef {
  MetricDef { name, source: MetricSource::PerGame(stat), weight, lower_is_better: false }
}

pub const POINTS_PER_GAME: &str = "points_per_game";
pub const GOALS_PER_GAME: &str = "goals_per_game";
pub const BLOCKS_PER_GAME: &str = "blocks_per_game";

const FORWARD: &[MetricDef] = &[
  per_game(POINTS_PER_GAME, catalog::POINTS, 3),
  per_game(GOALS_PER_GAME, catalog::GOALS, 2),
  direct(catalog::SHOOTING_PCT, 1),
  direct(catalog::CORSI_FOR_PCT, 2),
  direct(catalog::TOI_PER_GAME, 1),
  direct(catalog::FACEOFF_PCT, 1),
];

const DEFENSE: &[MetricDef] = &[
  per_game(POINTS_PER_GAME, catalog::POINTS, 2),
  direct(catalog::TOI_PER_GAME, 3),
  direct(catalog::CORSI_FOR_PCT, 2),
  direct(catalog::PLUS_MINUS, 1),
  per_game(BLOCKS_PER_GAME, catalog::BLOCKS, 1),
];

const GOALIE: &[MetricDef] = &[
  direct(catalog::SAVE_PCT, 4),
  MetricDef {
    name:            catalog::GOALS_AGAINST_AVG,
    source:          MetricSource::Direct(catalog::GOALS_AGAINST_AVG),
    weight:          3,
    lower_is_better: true,
  },
  direct(catalog::GOALS_SAVED_ABOVE_EXPECTED, 2),
  direct(catalog::GAMES_PLAYED, 1),
];

/// The rating dimensions for a position.
pub fn dimensions(position: Position) -> &'static [MetricDef] {
  match position {
    Position::Forward => FORWARD,
    Position::Defense => DEFENSE,
    Position::Goalie => GOALIE,
  }
}

/// Built-in cutoffs for a metric. Time on ice is in minutes.
pub fn default_cutoffs(position: Position, metric: &str) -> Option<Cutoffs> {
  use Position::*;
  Some(match (position, metric) {
    (Forward, POINTS_PER_GAME) => [0.15, 0.25, 0.35, 0.45, 0.58, 0.72, 0.90, 1.10],
    (Forward, GOALS_PER_GAME) => [0.05, 0.09, 0.13, 0.18, 0.24, 0.31, 0.39, 0.48],
    (Forward, catalog::SHOOTING_PCT) => [5.0, 7.0, 8.5, 10.0, 11.5, 13.0, 15.0, 17.5],
    (Forward | Defense, catalog::CORSI_FOR_PCT) => {
      [44.0, 46.0, 47.5, 49.0, 50.5, 52.0, 53.5, 55.5]
    }
    (Forward, catalog::TOI_PER_GAME) => [10.0, 11.5, 13.0, 14.5, 16.0, 17.5, 19.0, 20.5],
    (Forward, catalog::FACEOFF_PCT) => [40.0, 44.0, 46.5, 48.5, 50.5, 52.5, 54.5, 57.0],
    (Defense, POINTS_PER_GAME) => [0.08, 0.14, 0.20, 0.27, 0.35, 0.44, 0.56, 0.72],
    (Defense, catalog::TOI_PER_GAME) => [14.0, 16.0, 17.5, 19.0, 20.5, 22.0, 23.5, 25.0],
    (Defense, catalog::PLUS_MINUS) => [-20.0, -12.0, -6.0, -2.0, 2.0, 7.0, 13.0, 20.0],
    (Defense, BLOCKS_PER_GAME) => [0.5, 0.8, 1.0, 1.2, 1.4, 1.6, 1.9, 2.2],
    (Goalie, catalog::SAVE_PCT) => [0.885, 0.893, 0.899, 0.904, 0.908, 0.912, 0.917, 0.923],
    (Goalie, catalog::GOALS_AGAINST_AVG) => [2.20, 2.45, 2.65, 2.85, 3.00, 3.20, 3.45, 3.75],
    (Goalie, catalog::GOALS_SAVED_ABOVE_EXPECTED) => {
      [-15.0, -8.0, -4.0, -1.0, 2.0, 6.0, 11.0, 18.0]
    }
    (Goalie, catalog::GAMES_PLAYED) => [5.0, 12.0, 20.0, 28.0, 36.0, 44.0, 52.0, 60.0],
    _ => return None,
  })
}

/// Map a value onto the 1–9 stanine scale.
pub fn stanine(value: f64, cutoffs: &Cutoffs, lower_is_better: bool) -> u8 {
  let passed = if lower_is_better {
    cutoffs.iter().filter(|c| value <= **c).count()
  } else {
    cutoffs.iter().filter(|c| value >= **c).count()
  };
  1 + passed as u8
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_dimension_has_cutoffs() {
    for position in [Position::Forward, Position::Defense, Position::Goalie] {
      for metric in dimensions(position) {
        let cutoffs = default_cutoffs(position, metric.name)
          .unwrap_or_else(|| panic!("missing cutoffs for {position}.{}", metric.name));
        assert!(cutoffs.windows(2).all(|w| w[0] < w[1]), "{position}.{} not ascending", metric.name);
      }
    }
  }

  #[test]
  fn stanine_edges() {
    let c = default_cutoffs(Position::Forward, POINTS_PER_GAME).unwrap();
    assert_eq!(stanine(0.0, &c, false), 1);
    assert_eq!(stanine(0.50, &c, false), 5);
    assert_eq!(stanine(0.58, &c, false), 6);
    assert_eq!(stanine(1.5, &c, false), 9);
  }

  #[test]
  fn lower_is_better_inverts() {
    let c = default_cutoffs(Position::Goalie, catalog::GOALS_AGAINST_AVG).unwrap();
    assert_eq!(stanine(2.0, &c, true), 9);
    assert_eq!(stanine(4.1, &c, true), 1);
    assert_eq!(stanine(2.90, &c, true), 5);
  }
}
