//! Canonical facts — the resolver's output for one statistic, season and
//! league.
//!
//! A canonical fact is recomputed from the full record set on every run and
//! is never mutated. Every record that lost carries its reason in
//! [`CanonicalFact::rejected`], so nothing disappears silently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  record::{SourceRecord, SourceTier},
  season::SeasonLabel,
  value::StatValue,
};

/// Identity of a canonical fact. The league scope is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactKey {
  pub statistic_id: String,
  pub season:       SeasonLabel,
  pub league:       String,
}

impl FactKey {
  pub fn of(record: &SourceRecord) -> Self {
    Self {
      statistic_id: record.statistic_id.clone(),
      season:       record.season_label,
      league:       record.league.clone(),
    }
  }
}

/// A source record paired with its canonical value.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
  pub record: SourceRecord,
  pub value:  StatValue,
}

/// One record's claim, as shown to callers when a fact is contested or won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
  pub record_id:   String,
  pub value:       StatValue,
  /// Canonical rendering of `value`.
  pub display:     String,
  pub source_tier: SourceTier,
  pub source_url:  String,
  pub observed_at: Option<DateTime<Utc>>,
}

impl From<&NormalizedRecord> for Candidate {
  fn from(n: &NormalizedRecord) -> Self {
    Self {
      record_id:   n.record.record_id.clone(),
      display:     n.value.to_string(),
      value:       n.value.clone(),
      source_tier: n.record.source_tier,
      source_url:  n.record.source_url.clone(),
      observed_at: n.record.observed_at,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
  /// A more trusted tier had an eligible record.
  LowerTier,
  /// Same tier, but not the winning observation.
  OlderObservation,
  /// Tier-5 record without an independent matching record.
  Uncorroborated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
  pub candidate: Candidate,
  pub reason:    RejectReason,
}

/// The outcome of resolving one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
  Resolved { value: StatValue, winner: Candidate },
  /// Same-tier records with the latest observation disagree.
  Unresolved { candidates: Vec<Candidate> },
  /// Every record was ineligible.
  NoEligibleRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFact {
  pub key:        FactKey,
  pub resolution: Resolution,
  pub rejected:   Vec<RejectedRecord>,
}

impl CanonicalFact {
  pub fn value(&self) -> Option<&StatValue> {
    match &self.resolution {
      Resolution::Resolved { value, .. } => Some(value),
      _ => None,
    }
  }

  pub fn winner(&self) -> Option<&Candidate> {
    match &self.resolution {
      Resolution::Resolved { winner, .. } => Some(winner),
      _ => None,
    }
  }

  pub fn is_resolved(&self) -> bool { self.value().is_some() }
}
