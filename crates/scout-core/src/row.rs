//! Season rows — the three-season plus career view of one statistic.

use serde::{Deserialize, Serialize};

use crate::{
  fact::Candidate,
  record::SourceTier,
  season::Season,
  value::StatValue,
};

/// Why a cell has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapReason {
  /// The player has no records at all for this season.
  NoSeason,
  /// The season exists but nothing was reported for this statistic.
  NoRecord,
  /// A per-game rate in a season with zero games played.
  NoGamesPlayed,
  /// Only uncorroborated commentary reported this value.
  Uncorroborated,
  /// A season feeding the career aggregate is missing or unresolved.
  IncompleteAggregate,
  /// Contract and descriptive statistics have no career total.
  NotAggregable,
}

/// One table cell. Every state is explicit; a missing value is never
/// rendered as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Cell {
  Present {
    value:       StatValue,
    display:     String,
    league:      String,
    /// `None` for aggregates built from several facts.
    source_tier: Option<SourceTier>,
  },
  Zero {
    value:       StatValue,
    display:     String,
    league:      String,
    source_tier: Option<SourceTier>,
  },
  NotAvailable { reason: GapReason },
  Unresolved { candidates: Vec<Candidate> },
}

impl Cell {
  /// A value cell; numeric zero becomes [`Cell::Zero`].
  pub fn value(value: StatValue, league: impl Into<String>, source_tier: Option<SourceTier>) -> Self {
    let display = value.to_string();
    let league = league.into();
    if value.is_zero() {
      Self::Zero { value, display, league, source_tier }
    } else {
      Self::Present { value, display, league, source_tier }
    }
  }

  pub fn gap(reason: GapReason) -> Self { Self::NotAvailable { reason } }

  pub fn stat_value(&self) -> Option<&StatValue> {
    match self {
      Self::Present { value, .. } | Self::Zero { value, .. } => Some(value),
      _ => None,
    }
  }

  pub fn source_tier(&self) -> Option<SourceTier> {
    match self {
      Self::Present { source_tier, .. } | Self::Zero { source_tier, .. } => *source_tier,
      _ => None,
    }
  }

  pub fn league(&self) -> Option<&str> {
    match self {
      Self::Present { league, .. } | Self::Zero { league, .. } => Some(league),
      _ => None,
    }
  }

  pub fn gap_reason(&self) -> Option<GapReason> {
    match self {
      Self::NotAvailable { reason } => Some(*reason),
      _ => None,
    }
  }

  pub fn is_unresolved(&self) -> bool { matches!(self, Self::Unresolved { .. }) }
}

/// One season column of a [`SeasonRow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonColumn {
  /// `None` when the player has no seasons at all.
  pub season:  Option<Season>,
  /// The season is still in progress.
  pub to_date: bool,
  pub cell:    Cell,
}

/// Position of a column within a row, most recent first.
pub const MOST_RECENT: usize = 0;
pub const PRIOR: usize = 1;
pub const THREE_SEASONS_AGO: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SeasonRowRepr", from = "SeasonRowRepr")]
pub struct SeasonRow {
  pub statistic_id: String,
  /// Most recent first.
  pub columns:      [SeasonColumn; 3],
  pub career:       Cell,
}

impl SeasonRow {
  pub fn most_recent(&self) -> &SeasonColumn { &self.columns[MOST_RECENT] }
}

#[derive(Serialize, Deserialize)]
struct SeasonRowRepr {
  statistic_id:      String,
  most_recent:       SeasonColumn,
  prior:             SeasonColumn,
  three_seasons_ago: SeasonColumn,
  career:            Cell,
}

impl From<SeasonRow> for SeasonRowRepr {
  fn from(row: SeasonRow) -> Self {
    let [most_recent, prior, three_seasons_ago] = row.columns;
    Self { statistic_id: row.statistic_id, most_recent, prior, three_seasons_ago, career: row.career }
  }
}

impl From<SeasonRowRepr> for SeasonRow {
  fn from(repr: SeasonRowRepr) -> Self {
    Self {
      statistic_id: repr.statistic_id,
      columns:      [repr.most_recent, repr.prior, repr.three_seasons_ago],
      career:       repr.career,
    }
  }
}
