//! The rating engine.
//!
//! Converts a [`PlayerProfile`] into calibrated 1–9 current and future
//! ratings. Every input is a normalized, resolved fact taken from the
//! profile's season rows; a missing metric is skipped and lowers confidence,
//! never replaced by an invented value.

use chrono::NaiveDate;
use scout_core::{
  catalog,
  player::Position,
  profile::{Direction, PlayerProfile, SignalKind},
  rating::{DimensionScore, Horizon, Rating, RatingResult, Trend},
  record::SourceTier,
  row::{Cell, GapReason, MOST_RECENT},
  value::StatValue,
};

use crate::{
  benchmark::{self, MetricDef, MetricSource},
  confidence,
  config::EngineConfig,
};

/// Per-signal adjustment, and the bound on the summed adjustment.
const SIGNAL_STEP: f64 = 0.25;
const SIGNAL_BOUND: f64 = 0.5;
/// Composite change per season above which a trend counts as rising (or
/// below the negative as declining).
const TREND_THRESHOLD: f64 = 0.25;
const TREND_WEIGHT: f64 = 1.5;
const TREND_BOUND: f64 = 1.5;

// ─── Metric extraction ───────────────────────────────────────────────────────

/// A rated metric's value in one season column.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
  pub value:   f64,
  pub display: String,
  /// Tiers of the facts the value was computed from.
  pub tiers:   Vec<SourceTier>,
}

fn column_cell<'p>(profile: &'p PlayerProfile, statistic_id: &str, column: usize) -> Option<&'p Cell> {
  profile.row(statistic_id).map(|row| &row.columns[column].cell)
}

/// The value of `metric` in a season column, or `None` when any input is
/// missing, unresolved, or (for per-game metrics) games played is zero.
pub fn metric_value(profile: &PlayerProfile, metric: &MetricDef, column: usize) -> Option<MetricValue> {
  match metric.source {
    MetricSource::Direct(stat) => {
      let cell = column_cell(profile, stat, column)?;
      let value = cell.stat_value()?;
      Some(MetricValue {
        value:   value.as_f64()?,
        display: value.to_string(),
        tiers:   cell.source_tier().into_iter().collect(),
      })
    }
    MetricSource::PerGame(stat) => {
      let cell = column_cell(profile, stat, column)?;
      let gp_cell = column_cell(profile, catalog::GAMES_PLAYED, column)?;
      let games = match gp_cell.stat_value()? {
        StatValue::Count(gp) if *gp > 0 => *gp as f64,
        _ => return None,
      };
      let per_game = cell.stat_value()?.as_f64()? / games;
      Some(MetricValue {
        value:   per_game,
        display: format!("{per_game:.2}"),
        tiers:   cell.source_tier().into_iter().chain(gp_cell.source_tier()).collect(),
      })
    }
  }
}

/// Weighted stanine composite for one column, with per-metric scores.
/// The composite is `None` when no metric is available.
pub fn composite(
  profile: &PlayerProfile,
  config: &EngineConfig,
  column: usize,
) -> (Option<f64>, Vec<DimensionScore>) {
  let position = profile.player.position;
  let mut weighted = 0.0;
  let mut weights = 0.0;
  let scores: Vec<DimensionScore> = benchmark::dimensions(position)
    .iter()
    .map(|metric| {
      let found = metric_value(profile, metric, column)
        .and_then(|v| config.cutoffs(position, metric.name).map(|c| (v, c)));
      let (value, stanine) = match found {
        Some((v, cutoffs)) => {
          let s = benchmark::stanine(v.value, &cutoffs, metric.lower_is_better);
          weighted += f64::from(metric.weight) * f64::from(s);
          weights += f64::from(metric.weight);
          (Some(v.display), Some(s))
        }
        None => (None, None),
      };
      DimensionScore { metric: metric.name.to_owned(), weight: metric.weight, value, stanine }
    })
    .collect();
  let composite = (weights > 0.0).then(|| weighted / weights);
  (composite, scores)
}

// ─── Adjustments ─────────────────────────────────────────────────────────────

fn signal_adjustment(profile: &PlayerProfile, kind: SignalKind) -> f64 {
  let total: f64 = profile
    .signals_of(kind)
    .map(|s| match s.direction {
      Direction::Positive => SIGNAL_STEP,
      Direction::Negative => -SIGNAL_STEP,
    })
    .sum();
  total.clamp(-SIGNAL_BOUND, SIGNAL_BOUND)
}

/// Peak-age window per position, inclusive.
pub fn peak_window(position: Position) -> (u32, u32) {
  match position {
    Position::Forward => (24, 28),
    Position::Defense => (25, 29),
    Position::Goalie => (26, 31),
  }
}

/// Projection adjustment from the aging curve: growth before the peak,
/// decline after it.
pub fn age_adjustment(position: Position, age: u32) -> f64 {
  let (lo, hi) = peak_window(position);
  if age + 3 < lo {
    1.0
  } else if age < lo {
    0.5
  } else if age <= hi {
    0.0
  } else {
    let past = f64::from(age - hi);
    (-0.5 * (past / 2.0).ceil()).max(-1.5)
  }
}

/// Least-squares slope of `(x, y)` points.
fn slope(points: &[(f64, f64)]) -> Option<f64> {
  if points.len() < 2 {
    return None;
  }
  let n = points.len() as f64;
  let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
  let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
  let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
  let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
  (sxx > 0.0).then(|| sxy / sxx)
}

pub fn classify_trend(slope: Option<f64>) -> Trend {
  match slope {
    None => Trend::Unknown,
    Some(s) if s > TREND_THRESHOLD => Trend::Rising,
    Some(s) if s < -TREND_THRESHOLD => Trend::Declining,
    Some(_) => Trend::Flat,
  }
}

/// The future rating and whether it was held at the current one. Without a
/// rising trend, only positive age or development adjustments may lift the
/// projection above the current rating.
fn project(current_raw: f64, trend: Trend, trend_adj: f64, age_adj: f64, dev_adj: f64) -> (Rating, bool) {
  let current = Rating::from_f64(current_raw);
  let future = Rating::from_f64(current_raw + trend_adj + age_adj + dev_adj);
  let justified = age_adj > 0.0 || dev_adj > 0.0;
  if trend != Trend::Rising && !justified && future > current {
    (current, true)
  } else {
    (future, false)
  }
}

// ─── Rating ──────────────────────────────────────────────────────────────────

/// Rate a profile.
pub fn rate(profile: &PlayerProfile, config: &EngineConfig) -> RatingResult {
  let position = profile.player.position;
  let (latest, dimensions) = composite(profile, config, MOST_RECENT);

  let role_adj = signal_adjustment(profile, SignalKind::Role);
  let current_raw = latest.unwrap_or(f64::from(Rating::MEDIAN.get())) + role_adj;
  let current_rating = Rating::from_f64(current_raw);

  // Columns are most recent first; x counts seasons forward in time.
  let history: Vec<(usize, f64)> = (0..3)
    .filter_map(|column| composite(profile, config, column).0.map(|c| (column, c)))
    .collect();
  let points: Vec<(f64, f64)> = history.iter().map(|(col, c)| (-(*col as f64), *c)).collect();
  let trend_slope = if latest.is_some() { slope(&points) } else { None };
  let trend = classify_trend(trend_slope);

  let season_start = NaiveDate::from_ymd_opt(i32::from(config.current_season.start_year()), 9, 15);
  let age = season_start.and_then(|d| profile.player.age_at(d));
  let age_adj = age.map_or(0.0, |a| age_adjustment(position, a));
  let dev_adj = signal_adjustment(profile, SignalKind::Development);
  let trend_adj = trend_slope.map_or(0.0, |s| (s * TREND_WEIGHT).clamp(-TREND_BOUND, TREND_BOUND));

  let (future_rating, capped) = project(current_raw, trend, trend_adj, age_adj, dev_adj);

  let rationale = [
    current_bullet(profile, current_rating, &dimensions, role_adj),
    projection_bullet(
      profile,
      future_rating,
      &history,
      Projection { trend, slope: trend_slope, age, age_adj, dev_adj, capped },
    ),
    quality_bullet(profile, config, &dimensions),
  ];

  RatingResult {
    position,
    dimensions,
    current_rating,
    future_rating,
    current_confidence: confidence::confidence(profile, config, Horizon::Current),
    future_confidence: confidence::confidence(profile, config, Horizon::Future),
    trend,
    rationale,
  }
}

// ─── Rationale ───────────────────────────────────────────────────────────────

struct Projection {
  trend:   Trend,
  slope:   Option<f64>,
  age:     Option<u32>,
  age_adj: f64,
  dev_adj: f64,
  capped:  bool,
}

fn season_text(profile: &PlayerProfile, column: usize) -> String {
  profile
    .season_rows
    .values()
    .next()
    .and_then(|row| row.columns[column].season)
    .map_or_else(|| "no season".to_owned(), |s| s.to_string())
}

fn current_bullet(
  profile: &PlayerProfile,
  rating: Rating,
  dimensions: &[DimensionScore],
  role_adj: f64,
) -> String {
  let mut rated: Vec<&DimensionScore> = dimensions.iter().filter(|d| d.stanine.is_some()).collect();
  if rated.is_empty() {
    return format!(
      "Current {rating}/9 is the population median: no rateable {} metrics for {}.",
      profile.player.position,
      season_text(profile, MOST_RECENT)
    );
  }
  rated.sort_by(|a, b| b.weight.cmp(&a.weight));
  let evidence: Vec<String> = rated
    .iter()
    .take(3)
    .map(|d| {
      format!(
        "{} {} (stanine {})",
        d.metric,
        d.value.as_deref().unwrap_or("n/a"),
        d.stanine.unwrap_or_default()
      )
    })
    .collect();
  let mut text =
    format!("Current {rating}/9 from {}: {}", season_text(profile, MOST_RECENT), evidence.join(", "));
  if role_adj != 0.0 {
    text.push_str(&format!("; role signals {role_adj:+.2}"));
  }
  text.push('.');
  text
}

fn projection_bullet(
  profile: &PlayerProfile,
  rating: Rating,
  history: &[(usize, f64)],
  p: Projection,
) -> String {
  let basis = match p.slope {
    Some(slope) => {
      let path: Vec<String> = history
        .iter()
        .rev()
        .map(|(column, c)| format!("{} {c:.2}", season_text(profile, *column)))
        .collect();
      format!("composite {} ({:?}, {slope:+.2}/season)", path.join(" → "), p.trend).to_lowercase()
    }
    None => format!(
      "only {} rated season, no trend",
      if history.is_empty() { "no" } else { "one" }
    ),
  };
  let age = match p.age {
    Some(age) => format!("age {age} ({:+.1})", p.age_adj),
    None => "age unknown".to_owned(),
  };
  let mut text = format!("Projected {rating}/9 from {basis}; {age}");
  if p.dev_adj != 0.0 {
    text.push_str(&format!("; development signals {:+.2}", p.dev_adj));
  }
  if p.capped {
    text.push_str("; held at the current rating without a rising trend or age/development support");
  } else if p.trend != Trend::Rising && (p.age_adj > 0.0 || p.dev_adj > 0.0) {
    text.push_str("; growth credited to age and development, not trend");
  }
  text.push('.');
  text
}

fn quality_bullet(profile: &PlayerProfile, config: &EngineConfig, dimensions: &[DimensionScore]) -> String {
  let mut issues = Vec::new();
  let missing: Vec<&str> =
    dimensions.iter().filter(|d| d.stanine.is_none()).map(|d| d.metric.as_str()).collect();
  if !missing.is_empty() {
    issues.push(format!("missing {}", missing.join(", ")));
  }
  let inputs = confidence::inputs_for(profile, config);
  if inputs.discrepancies > 0 {
    issues.push(format!("{} unresolved discrepancies", inputs.discrepancies));
  }
  if inputs.stale_seasons > 0 {
    issues.push(format!(
      "latest data {} beyond the freshness window",
      plural(inputs.stale_seasons.into(), "season")
    ));
  }
  let zero_gp = profile
    .row(catalog::GAMES_PLAYED)
    .is_some_and(|row| matches!(row.columns[MOST_RECENT].cell, Cell::Zero { .. }));
  let blocked = profile.season_rows.values().any(|row| {
    row.columns[MOST_RECENT].cell.gap_reason() == Some(GapReason::NoGamesPlayed)
  });
  if zero_gp || blocked {
    issues.push("no games played in the latest season".to_owned());
  }
  if profile.seasons.len() < 2 {
    issues.push(format!("{} of history", plural(profile.seasons.len(), "season")));
  }

  if issues.is_empty() {
    let mut tiers: Vec<u8> = dimensions
      .iter()
      .filter(|d| d.stanine.is_some())
      .flat_map(|d| {
        benchmark::dimensions(profile.player.position)
          .iter()
          .filter(|m| m.name == d.metric)
          .filter_map(|m| metric_value(profile, m, MOST_RECENT))
          .flat_map(|v| v.tiers)
          .map(|t| t.number())
          .collect::<Vec<_>>()
      })
      .collect();
    tiers.sort_unstable();
    tiers.dedup();
    let tiers: Vec<String> = tiers.iter().map(|t| t.to_string()).collect();
    format!(
      "Data quality: all rated metrics present from tier {} facts across {}.",
      tiers.join("/"),
      plural(profile.seasons.len(), "season")
    )
  } else {
    format!("Data quality: {}.", issues.join("; "))
  }
}

fn plural(n: usize, noun: &str) -> String {
  if n == 1 { format!("1 {noun}") } else { format!("{n} {noun}s") }
}
