//! The conflict resolver.
//!
//! Reduces every record for a (statistic, season, league) key to a single
//! [`CanonicalFact`]. Resolution is a pure function of the record set: the
//! input order never matters, and the same records always give the same
//! facts.

use std::collections::BTreeMap;

use scout_core::{
  fact::{
    Candidate, CanonicalFact, FactKey, NormalizedRecord, RejectReason, RejectedRecord,
    Resolution,
  },
  season::SeasonLabel,
};
use tracing::debug;

/// Resolve every key present in `records`. Facts are ordered by key.
pub fn resolve_all(records: &[NormalizedRecord]) -> Vec<CanonicalFact> {
  let mut groups: BTreeMap<FactKey, Vec<&NormalizedRecord>> = BTreeMap::new();
  for n in records {
    groups.entry(FactKey::of(&n.record)).or_default().push(n);
  }
  groups.into_iter().map(|(key, group)| resolve_key(key, group)).collect()
}

/// Resolve one statistic and season: one fact per league scope present.
pub fn resolve(
  records: &[NormalizedRecord],
  statistic_id: &str,
  season_label: SeasonLabel,
) -> Vec<CanonicalFact> {
  let matching: Vec<NormalizedRecord> = records
    .iter()
    .filter(|n| n.record.statistic_id == statistic_id && n.record.season_label == season_label)
    .cloned()
    .collect();
  resolve_all(&matching)
}

fn reject(n: &NormalizedRecord, reason: RejectReason) -> RejectedRecord {
  RejectedRecord { candidate: Candidate::from(n), reason }
}

fn resolve_key(key: FactKey, mut group: Vec<&NormalizedRecord>) -> CanonicalFact {
  group.sort_by(|a, b| a.record.record_id.cmp(&b.record.record_id));
  let mut rejected = Vec::new();

  // Commentary needs an independent record with the same value.
  let (eligible, uncorroborated): (Vec<_>, Vec<_>) = group.iter().copied().partition(|n| {
    !n.record.source_tier.requires_corroboration()
      || group.iter().any(|other| {
        other.record.record_id != n.record.record_id
          && other.value == n.value
          && other.record.source_host() != n.record.source_host()
      })
  });
  rejected.extend(uncorroborated.iter().map(|n| reject(n, RejectReason::Uncorroborated)));

  let Some(best_tier) = eligible.iter().map(|n| n.record.source_tier).min() else {
    debug!(statistic = %key.statistic_id, season = %key.season, league = %key.league, "no eligible record");
    return CanonicalFact { key, resolution: Resolution::NoEligibleRecord, rejected };
  };

  let (top, lower): (Vec<_>, Vec<_>) =
    eligible.into_iter().partition(|n| n.record.source_tier == best_tier);
  rejected.extend(lower.iter().map(|n| reject(n, RejectReason::LowerTier)));

  // A missing timestamp is the least recent observation.
  let latest = top.iter().map(|n| n.record.observed_at).max().flatten();
  let (newest, older): (Vec<_>, Vec<_>) =
    top.into_iter().partition(|n| n.record.observed_at == latest);
  rejected.extend(older.iter().map(|n| reject(n, RejectReason::OlderObservation)));

  let resolution = match newest.split_first() {
    Some((first, rest)) if rest.iter().all(|n| n.value == first.value) => {
      rejected.extend(rest.iter().map(|n| reject(n, RejectReason::OlderObservation)));
      debug!(
        statistic = %key.statistic_id,
        season = %key.season,
        league = %key.league,
        value = %first.value,
        tier = best_tier.number(),
        "resolved"
      );
      Resolution::Resolved { value: first.value.clone(), winner: Candidate::from(*first) }
    }
    _ => {
      debug!(
        statistic = %key.statistic_id,
        season = %key.season,
        league = %key.league,
        candidates = newest.len(),
        "unresolved same-tier conflict"
      );
      Resolution::Unresolved { candidates: newest.iter().map(|n| Candidate::from(*n)).collect() }
    }
  };

  CanonicalFact { key, resolution, rejected }
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, TimeZone, Utc};
  use scout_core::{
    record::{NewSourceRecord, SourceRecord, SourceTier},
    season::Season,
    value::StatValue,
  };

  use super::*;

  fn at(day: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap() }

  fn record(
    value: i64,
    tier: SourceTier,
    url: &str,
    observed: Option<DateTime<Utc>>,
  ) -> NormalizedRecord {
    let mut input = NewSourceRecord::new(
      "p1",
      "goals",
      Season::new(2024).into(),
      "NHL",
      value,
      tier,
      url,
    );
    input.observed_at = observed;
    let record = SourceRecord::from_new(input, at(1)).unwrap();
    NormalizedRecord { record, value: StatValue::Count(value) }
  }

  fn only(facts: Vec<CanonicalFact>) -> CanonicalFact {
    assert_eq!(facts.len(), 1);
    facts.into_iter().next().unwrap()
  }

  #[test]
  fn most_trusted_tier_wins() {
    let records = vec![
      record(42, SourceTier::Official, "https://nhl.com/a", None),
      record(40, SourceTier::Aggregator, "https://stats.example/a", Some(at(9))),
      record(42, SourceTier::Commentary, "https://blog.example/a", Some(at(9))),
    ];
    let fact = only(resolve_all(&records));
    assert_eq!(fact.value(), Some(&StatValue::Count(42)));
    assert_eq!(fact.winner().unwrap().source_tier, SourceTier::Official);
    assert_eq!(fact.rejected.len(), 2);
    assert!(fact.rejected.iter().all(|r| r.reason == RejectReason::LowerTier));
  }

  #[test]
  fn later_observation_wins_within_tier() {
    let records = vec![
      record(40, SourceTier::Authority, "https://a.example/1", Some(at(2))),
      record(41, SourceTier::Authority, "https://b.example/1", Some(at(5))),
    ];
    let fact = only(resolve_all(&records));
    assert_eq!(fact.value(), Some(&StatValue::Count(41)));
    assert_eq!(fact.rejected[0].reason, RejectReason::OlderObservation);
  }

  #[test]
  fn missing_timestamp_is_least_recent() {
    let records = vec![
      record(40, SourceTier::Authority, "https://a.example/1", None),
      record(41, SourceTier::Authority, "https://b.example/1", Some(at(2))),
    ];
    assert_eq!(only(resolve_all(&records)).value(), Some(&StatValue::Count(41)));
  }

  #[test]
  fn equal_timestamps_with_different_values_are_unresolved() {
    let records = vec![
      record(40, SourceTier::Authority, "https://a.example/1", Some(at(5))),
      record(41, SourceTier::Authority, "https://b.example/1", Some(at(5))),
    ];
    let fact = only(resolve_all(&records));
    match fact.resolution {
      Resolution::Unresolved { candidates } => assert_eq!(candidates.len(), 2),
      other => panic!("expected unresolved, got {other:?}"),
    }
  }

  #[test]
  fn uncorroborated_commentary_is_ineligible() {
    let records = vec![record(42, SourceTier::Commentary, "https://blog.example/a", None)];
    let fact = only(resolve_all(&records));
    assert_eq!(fact.resolution, Resolution::NoEligibleRecord);
    assert_eq!(fact.rejected[0].reason, RejectReason::Uncorroborated);
  }

  #[test]
  fn commentary_from_the_same_host_does_not_corroborate_itself() {
    let records = vec![
      record(42, SourceTier::Commentary, "https://blog.example/a", None),
      record(42, SourceTier::Commentary, "https://www.blog.example/b", Some(at(3))),
    ];
    assert_eq!(only(resolve_all(&records)).resolution, Resolution::NoEligibleRecord);

    let records = vec![
      record(42, SourceTier::Commentary, "https://blog.example/a", None),
      record(42, SourceTier::Commentary, "https://fans.example/b", Some(at(3))),
    ];
    assert_eq!(only(resolve_all(&records)).value(), Some(&StatValue::Count(42)));
  }

  #[test]
  fn resolution_ignores_input_order() {
    let mut records = vec![
      record(42, SourceTier::Official, "https://nhl.com/a", Some(at(4))),
      record(42, SourceTier::Official, "https://nhl.com/b", Some(at(4))),
      record(39, SourceTier::Editorial, "https://paper.example/c", None),
    ];
    let forward = resolve_all(&records);
    records.reverse();
    assert_eq!(resolve_all(&records), forward);
  }

  #[test]
  fn league_scopes_resolve_separately() {
    let mut khl = record(12, SourceTier::Official, "https://khl.ru/a", None);
    khl.record.league = "KHL".into();
    let records = vec![record(20, SourceTier::Official, "https://nhl.com/a", None), khl];
    let facts = resolve(&records, "goals", Season::new(2024).into());
    assert_eq!(facts.len(), 2);
    assert!(facts.iter().all(CanonicalFact::is_resolved));
  }
}
