//! Source records — immutable, tier-tagged claims about one statistic for one
//! player and season, exactly as a source reported them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, normalize::UnitClass, season::SeasonLabel, value::RawValue};

// ─── Tiers ───────────────────────────────────────────────────────────────────

/// Trust ranking of a record's origin. Tier 1 is the most trusted; ordering
/// follows the tier number, so `min()` picks the most trusted tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SourceTier {
  /// Official league or team publication.
  Official = 1,
  /// Contract authority or primary statistics portal.
  Authority = 2,
  /// Secondary analytics aggregator.
  Aggregator = 3,
  /// Major editorial outlet.
  Editorial = 4,
  /// Secondary commentary; only usable when corroborated.
  Commentary = 5,
}

impl SourceTier {
  pub const ALL: [SourceTier; 5] =
    [Self::Official, Self::Authority, Self::Aggregator, Self::Editorial, Self::Commentary];

  pub fn number(&self) -> u8 { *self as u8 }

  pub fn requires_corroboration(&self) -> bool { matches!(self, Self::Commentary) }
}

impl fmt::Display for SourceTier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "tier {}", self.number())
  }
}

impl From<SourceTier> for u8 {
  fn from(value: SourceTier) -> Self { value.number() }
}

impl TryFrom<u8> for SourceTier {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::ALL
      .into_iter()
      .find(|tier| tier.number() == value)
      .ok_or(Error::InvalidTier(value))
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Input for [`crate::store::RecordStore::add_record`]. The store derives the
/// record id from these fields and stamps `recorded_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSourceRecord {
  pub player_id:    String,
  pub statistic_id: String,
  pub season_label: SeasonLabel,
  /// League scope, e.g. `NHL`.
  pub league:       String,
  pub value:        RawValue,
  /// Explicit unit; falls back to the catalog unit for `statistic_id`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unit:         Option<UnitClass>,
  pub source_tier:  SourceTier,
  pub source_url:   String,
  #[serde(default)]
  pub observed_at:  Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note:         Option<String>,
}

impl NewSourceRecord {
  pub fn new(
    player_id: impl Into<String>,
    statistic_id: impl Into<String>,
    season_label: SeasonLabel,
    league: impl Into<String>,
    value: impl Into<RawValue>,
    source_tier: SourceTier,
    source_url: impl Into<String>,
  ) -> Self {
    Self {
      player_id: player_id.into(),
      statistic_id: statistic_id.into(),
      season_label,
      league: league.into(),
      value: value.into(),
      unit: None,
      source_tier,
      source_url: source_url.into(),
      observed_at: None,
      note: None,
    }
  }

  pub fn observed_at(mut self, at: DateTime<Utc>) -> Self {
    self.observed_at = Some(at);
    self
  }

  pub fn unit(mut self, unit: UnitClass) -> Self {
    self.unit = Some(unit);
    self
  }

  pub fn note(mut self, note: impl Into<String>) -> Self {
    self.note = Some(note.into());
    self
  }

  /// SHA-256 hex digest of the record's content. Byte-identical records
  /// share an id.
  pub fn content_id(&self) -> crate::Result<String> {
    let bytes = serde_json::to_vec(self)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
  }
}

/// A persisted source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
  pub record_id:    String,
  pub player_id:    String,
  pub statistic_id: String,
  pub season_label: SeasonLabel,
  pub league:       String,
  pub value:        RawValue,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unit:         Option<UnitClass>,
  pub source_tier:  SourceTier,
  pub source_url:   String,
  pub observed_at:  Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note:         Option<String>,
  pub recorded_at:  DateTime<Utc>,
}

impl SourceRecord {
  /// Attach an id and a recording timestamp to `input`.
  pub fn from_new(input: NewSourceRecord, recorded_at: DateTime<Utc>) -> crate::Result<Self> {
    let record_id = input.content_id()?;
    Ok(Self {
      record_id,
      player_id: input.player_id,
      statistic_id: input.statistic_id,
      season_label: input.season_label,
      league: input.league,
      value: input.value,
      unit: input.unit,
      source_tier: input.source_tier,
      source_url: input.source_url,
      observed_at: input.observed_at,
      note: input.note,
      recorded_at,
    })
  }

  /// Host part of `source_url`, lowercased and without a `www.` prefix.
  /// Two records are from independent sources when their hosts differ.
  pub fn source_host(&self) -> String {
    let url = self.source_url.trim();
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = host.split(':').next().unwrap_or_default().to_ascii_lowercase();
    match host.strip_prefix("www.") {
      Some(bare) => bare.to_owned(),
      None => host.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::season::Season;

  fn sample() -> NewSourceRecord {
    NewSourceRecord::new(
      "edm_connor_mcdavid",
      "goals",
      Season::new(2023).into(),
      "NHL",
      32_i64,
      SourceTier::Official,
      "https://www.nhl.com/player/8478402",
    )
  }

  #[test]
  fn identical_content_has_identical_id() {
    assert_eq!(sample().content_id().unwrap(), sample().content_id().unwrap());
    let other = NewSourceRecord { value: 33_i64.into(), ..sample() };
    assert_ne!(sample().content_id().unwrap(), other.content_id().unwrap());
  }

  #[test]
  fn tier_round_trips_through_u8() {
    assert_eq!(SourceTier::try_from(3).unwrap(), SourceTier::Aggregator);
    assert!(SourceTier::try_from(6).is_err());
    assert!(SourceTier::Official < SourceTier::Commentary);
    let json = serde_json::to_string(&SourceTier::Editorial).unwrap();
    assert_eq!(json, "4");
  }

  #[test]
  fn source_host_ignores_scheme_and_www() {
    let record = SourceRecord::from_new(sample(), Utc::now()).unwrap();
    assert_eq!(record.source_host(), "nhl.com");
    let other = SourceRecord {
      source_url: "HTTP://Stats.Example.org:8080/a?b".into(),
      ..record
    };
    assert_eq!(other.source_host(), "stats.example.org");
  }
}
