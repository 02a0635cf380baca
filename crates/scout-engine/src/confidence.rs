//! The confidence estimator.
//!
//! Confidence measures how well a rating is supported: how many rated
//! metrics are present, how trusted their sources are, how much history
//! exists, how fresh it is, and whether any rated statistic is contested.

use scout_core::{
  fact::Resolution,
  profile::PlayerProfile,
  rating::{ConfidenceScore, Horizon},
  record::SourceTier,
  row::MOST_RECENT,
};

use crate::{
  benchmark::{self, MetricSource},
  config::EngineConfig,
  rating::metric_value,
};

/// Ceiling applied when too few rated metrics are present.
pub const INSUFFICIENT_DATA_CAP: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
  /// Fraction of the position's rated metrics present, 0..=1.
  pub completeness:     f64,
  /// Tier coverage of the rated metrics, 0..=1: each present metric
  /// contributes the weight of its weakest source, missing metrics nothing.
  pub tier_quality:     f64,
  /// Seasons with data in the three-season window, divided by three.
  pub history:          f64,
  /// Seasons by which the latest data exceeds the freshness threshold.
  pub stale_seasons:    u16,
  /// Unresolved conflicts touching rated statistics.
  pub discrepancies:    usize,
  /// Seasons with any performance record.
  pub observed_seasons: usize,
}

pub fn tier_weight(tier: SourceTier) -> f64 {
  match tier {
    SourceTier::Official => 1.0,
    SourceTier::Authority => 0.9,
    SourceTier::Aggregator => 0.75,
    SourceTier::Editorial => 0.55,
    SourceTier::Commentary => 0.4,
  }
}

fn raw(inputs: &ConfidenceInputs, horizon: Horizon) -> f64 {
  let c = inputs.completeness.clamp(0.0, 1.0);
  let q = inputs.tier_quality.clamp(0.0, 1.0);
  let h = inputs.history.clamp(0.0, 1.0);
  let penalties = 15.0 * f64::from(inputs.stale_seasons) + 8.0 * inputs.discrepancies as f64;
  match horizon {
    Horizon::Current => 100.0 * (0.45 * c + 0.35 * q + 0.20 * h) - penalties,
    Horizon::Future => 100.0 * (0.35 * c + 0.25 * q + 0.40 * h) - 10.0 - penalties,
  }
}

fn capped(inputs: &ConfidenceInputs, horizon: Horizon, min_coverage: f64) -> f64 {
  let score = raw(inputs, horizon);
  if inputs.completeness < min_coverage { score.min(INSUFFICIENT_DATA_CAP) } else { score }
}

/// Score one horizon. Pure and monotone: never decreases as completeness,
/// tier quality or history grow, and never increases with staleness or
/// discrepancies.
pub fn score(inputs: &ConfidenceInputs, horizon: Horizon, min_coverage: f64) -> ConfidenceScore {
  let mut value = capped(inputs, horizon, min_coverage);
  if horizon == Horizon::Future && inputs.observed_seasons < 2 {
    value = value.min(capped(inputs, Horizon::Current, min_coverage));
  }
  ConfidenceScore::from_f64(value)
}

/// Gather confidence inputs from a profile.
pub fn inputs_for(profile: &PlayerProfile, config: &EngineConfig) -> ConfidenceInputs {
  let metrics = benchmark::dimensions(profile.player.position);
  let present: Vec<_> =
    metrics.iter().filter_map(|m| metric_value(profile, m, MOST_RECENT)).collect();

  let completeness =
    if metrics.is_empty() { 0.0 } else { present.len() as f64 / metrics.len() as f64 };

  let covered: f64 = present
    .iter()
    .map(|m| m.tiers.iter().copied().map(tier_weight).reduce(f64::min).unwrap_or(0.0))
    .sum();
  let tier_quality = if metrics.is_empty() { 0.0 } else { covered / metrics.len() as f64 };

  let window: Vec<_> = match profile.most_recent_season() {
    Some(latest) => (0..3).map(|n| latest.back(n)).collect(),
    None => Vec::new(),
  };
  let in_window = window.iter().filter(|s| profile.seasons.contains(s)).count();

  let stale_seasons = profile.most_recent_season().map_or(0, |latest| {
    latest.seasons_until(config.current_season).saturating_sub(config.freshness_seasons)
  });

  let rated_stats: Vec<&str> = metrics
    .iter()
    .flat_map(|m| match m.source {
      MetricSource::Direct(stat) => vec![stat],
      MetricSource::PerGame(stat) => vec![stat, scout_core::catalog::GAMES_PLAYED],
    })
    .collect();
  let discrepancies = profile
    .facts
    .iter()
    .filter(|f| matches!(f.resolution, Resolution::Unresolved { .. }))
    .filter(|f| rated_stats.contains(&f.key.statistic_id.as_str()))
    .filter(|f| f.key.season.season().is_some_and(|s| window.contains(&s)))
    .count();

  ConfidenceInputs {
    completeness,
    tier_quality,
    history: in_window as f64 / 3.0,
    stale_seasons,
    discrepancies,
    observed_seasons: profile.seasons.len(),
  }
}

/// Confidence in a profile's rating for one horizon.
pub fn confidence(
  profile: &PlayerProfile,
  config: &EngineConfig,
  horizon: Horizon,
) -> ConfidenceScore {
  score(&inputs_for(profile, config), horizon, config.min_coverage)
}
