//! The season table builder.
//!
//! Lays canonical facts out as three-season rows plus a career column, and
//! assembles the contract summary. The season axis is player-wide: the most
//! recent column is the latest season with any performance record, and the
//! other two are the calendar seasons before it, whether or not the player
//! has records for them.
//!
//! Facts with no eligible record never shape the axis.
//!
//! Within a season, the highest-priority league with any fact is the
//! season's primary league and fills every cell. Facts from other leagues
//! stay available as league-qualified canonical facts.

use std::collections::{BTreeMap, BTreeSet};

use scout_core::{
  catalog::{self, StatKind},
  fact::{CanonicalFact, FactKey, Resolution},
  profile::ContractSummary,
  row::{Cell, GapReason, SeasonColumn, SeasonRow},
  season::{Season, SeasonLabel},
  value::{StatValue, div_round_half_up},
};

use crate::config::EngineConfig;

/// League label for aggregates spanning several leagues.
pub const MULTIPLE_LEAGUES: &str = "multiple";

pub struct SeasonTableBuilder<'a> {
  config:         &'a EngineConfig,
  facts:          BTreeMap<&'a FactKey, &'a CanonicalFact>,
  /// Seasons with performance records, most recent first.
  seasons:        Vec<Season>,
  primary_league: BTreeMap<Season, &'a str>,
}

fn is_contract(statistic_id: &str) -> bool { catalog::kind_of(statistic_id) == StatKind::Contract }

/// Whether any record survived the corroboration gate for this fact.
fn has_eligible_record(fact: &CanonicalFact) -> bool {
  !matches!(fact.resolution, Resolution::NoEligibleRecord)
}

/// The cell a single fact renders as.
fn fact_cell(fact: &CanonicalFact) -> Cell {
  match &fact.resolution {
    Resolution::Resolved { value, winner } => {
      Cell::value(value.clone(), fact.key.league.clone(), Some(winner.source_tier))
    }
    Resolution::Unresolved { candidates } => Cell::Unresolved { candidates: candidates.clone() },
    Resolution::NoEligibleRecord => Cell::gap(GapReason::Uncorroborated),
  }
}

impl<'a> SeasonTableBuilder<'a> {
  pub fn new(facts: &'a [CanonicalFact], config: &'a EngineConfig) -> Self {
    let mut primary_league: BTreeMap<Season, &'a str> = BTreeMap::new();
    let mut seasons = BTreeSet::new();
    for fact in facts
      .iter()
      .filter(|f| !is_contract(&f.key.statistic_id) && has_eligible_record(f))
    {
      let Some(season) = fact.key.season.season() else { continue };
      seasons.insert(season);
      let league = fact.key.league.as_str();
      primary_league
        .entry(season)
        .and_modify(|best| {
          if config.league_rank(league) < config.league_rank(*best) {
            *best = league;
          }
        })
        .or_insert(league);
    }
    Self {
      config,
      facts: facts.iter().map(|f| (&f.key, f)).collect(),
      seasons: seasons.into_iter().rev().collect(),
      primary_league,
    }
  }

  /// Seasons with performance records, most recent first.
  pub fn seasons(&self) -> &[Season] { &self.seasons }

  /// The three column seasons, most recent first; all `None` when the
  /// player has no seasons.
  pub fn axis(&self) -> [Option<Season>; 3] {
    match self.seasons.first() {
      Some(latest) => [Some(*latest), Some(latest.back(1)), Some(latest.back(2))],
      None => [None; 3],
    }
  }

  pub fn primary_league(&self, season: Season) -> Option<&'a str> {
    self.primary_league.get(&season).copied()
  }

  fn fact(&self, statistic_id: &str, season: SeasonLabel, league: &str) -> Option<&'a CanonicalFact> {
    let key = FactKey { statistic_id: statistic_id.to_owned(), season, league: league.to_owned() };
    self.facts.get(&key).copied()
  }

  /// Resolved games played in the season's primary league.
  fn games_played(&self, season: Season) -> Option<i64> {
    let league = self.primary_league(season)?;
    match self.fact(catalog::GAMES_PLAYED, season.into(), league)?.value()? {
      StatValue::Count(gp) => Some(*gp),
      _ => None,
    }
  }

  /// The primary cell for one statistic in one season.
  pub fn cell(&self, statistic_id: &str, season: Season) -> Cell {
    let Some(league) = self.primary_league(season) else {
      return Cell::gap(GapReason::NoSeason);
    };
    if catalog::kind_of(statistic_id) == StatKind::Rate && self.games_played(season) == Some(0) {
      return Cell::gap(GapReason::NoGamesPlayed);
    }
    match self.fact(statistic_id, season.into(), league) {
      Some(fact) => fact_cell(fact),
      None => Cell::gap(GapReason::NoRecord),
    }
  }

  pub fn build(&self, statistic_id: &str) -> SeasonRow {
    let columns = self.axis().map(|season| SeasonColumn {
      season,
      to_date: season == Some(self.config.current_season),
      cell: match season {
        Some(season) => self.cell(statistic_id, season),
        None => Cell::gap(GapReason::NoSeason),
      },
    });
    SeasonRow { statistic_id: statistic_id.to_owned(), columns, career: self.career(statistic_id) }
  }

  /// Rows for every performance statistic with at least one fact.
  pub fn build_all(&self) -> BTreeMap<String, SeasonRow> {
    let ids: BTreeSet<&str> = self
      .facts
      .keys()
      .map(|k| k.statistic_id.as_str())
      .filter(|id| !is_contract(id))
      .collect();
    ids.into_iter().map(|id| (id.to_owned(), self.build(id))).collect()
  }

  // ── Career ────────────────────────────────────────────────────────────

  pub fn career(&self, statistic_id: &str) -> Cell {
    let kind = catalog::kind_of(statistic_id);
    if matches!(kind, StatKind::Contract | StatKind::Descriptive) {
      return Cell::gap(GapReason::NotAggregable);
    }

    let explicit = self
      .facts
      .values()
      .filter(|f| f.key.statistic_id == statistic_id && f.key.season == SeasonLabel::Career)
      .min_by_key(|f| self.config.league_rank(&f.key.league));
    match explicit {
      Some(fact) if fact.resolution != Resolution::NoEligibleRecord => return fact_cell(fact),
      _ => {}
    }

    if self.seasons.is_empty() {
      return Cell::gap(GapReason::NoSeason);
    }
    match kind {
      StatKind::Counting => self.career_sum(statistic_id),
      _ => self.career_weighted_mean(statistic_id),
    }
  }

  fn career_sum(&self, statistic_id: &str) -> Cell {
    let mut parts = Vec::new();
    for season in &self.seasons {
      match self.cell(statistic_id, *season).stat_value() {
        Some(value) => parts.push((value.clone(), self.primary_league(*season), 1)),
        None => return Cell::gap(GapReason::IncompleteAggregate),
      }
    }
    aggregate(parts, Aggregate::Sum)
  }

  fn career_weighted_mean(&self, statistic_id: &str) -> Cell {
    let mut parts = Vec::new();
    for season in &self.seasons {
      let Some(gp) = self.games_played(*season) else {
        return Cell::gap(GapReason::IncompleteAggregate);
      };
      if gp == 0 {
        continue;
      }
      match self.cell(statistic_id, *season).stat_value() {
        Some(value) => parts.push((value.clone(), self.primary_league(*season), gp)),
        None => return Cell::gap(GapReason::IncompleteAggregate),
      }
    }
    if parts.is_empty() {
      return Cell::gap(GapReason::NoGamesPlayed);
    }
    aggregate(parts, Aggregate::WeightedMean)
  }

  // ── Contract ──────────────────────────────────────────────────────────

  /// Cap hit, term and status from the latest season that reports each.
  pub fn contract_summary(&self) -> ContractSummary {
    ContractSummary {
      cap_hit: self.contract_cell(catalog::CAP_HIT),
      term:    self.contract_cell(catalog::CONTRACT_TERM),
      status:  self.contract_cell(catalog::CONTRACT_STATUS),
    }
  }

  fn contract_cell(&self, statistic_id: &str) -> Cell {
    self
      .facts
      .values()
      .filter(|f| f.key.statistic_id == statistic_id && has_eligible_record(f))
      .min_by(|a, b| {
        b.key
          .season
          .cmp(&a.key.season)
          .then_with(|| self.config.league_rank(&a.key.league).cmp(&self.config.league_rank(&b.key.league)))
      })
      .map_or(Cell::gap(GapReason::NoRecord), |f| fact_cell(f))
  }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Aggregate {
  Sum,
  /// Mean weighted by games played, rounded half up at the unit's scale.
  WeightedMean,
}

/// Combine `(value, league, games played)` parts into one career cell.
fn aggregate(parts: Vec<(StatValue, Option<&str>, i64)>, mode: Aggregate) -> Cell {
  let Some((template, _, _)) = parts.first() else {
    return Cell::gap(GapReason::NoRecord);
  };
  let template = template.clone();

  let mut total: i128 = 0;
  let mut games: i128 = 0;
  for (value, _, gp) in &parts {
    if value.unit() != template.unit() {
      return Cell::gap(GapReason::IncompleteAggregate);
    }
    let Some(units) = value.scaled_units() else {
      return Cell::gap(GapReason::NotAggregable);
    };
    match mode {
      Aggregate::Sum => total += i128::from(units),
      Aggregate::WeightedMean => {
        total += i128::from(units) * i128::from(*gp);
        games += i128::from(*gp);
      }
    }
  }
  let units = match mode {
    Aggregate::Sum => total,
    Aggregate::WeightedMean => div_round_half_up(total, games),
  };

  let leagues: BTreeSet<&str> = parts.iter().filter_map(|(_, l, _)| *l).collect();
  let league = match leagues.len() {
    1 => leagues.into_iter().next().unwrap_or(MULTIPLE_LEAGUES),
    _ => MULTIPLE_LEAGUES,
  };

  match i64::try_from(units).ok().and_then(|u| template.with_scaled_units(u)) {
    Some(value) => Cell::value(value, league, None),
    None => Cell::gap(GapReason::IncompleteAggregate),
  }
}
