//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, dates as `YYYY-MM-DD`. Raw
//! values and evaluation outputs are stored as compact JSON. Season labels,
//! positions and unit classes use their canonical display forms.

use chrono::{DateTime, NaiveDate, Utc};
use scout_core::{
  normalize::UnitClass,
  player::{Player, Position},
  record::{SourceRecord, SourceTier},
  season::SeasonLabel,
  value::RawValue,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_position(p: Position) -> String { p.to_string() }

pub fn decode_position(s: &str) -> Result<Position> {
  s.parse().map_err(|_| Error::Decode { column: "position", value: s.to_owned() })
}

pub fn decode_unit(s: &str) -> Result<UnitClass> {
  s.parse().map_err(|_| Error::Decode { column: "unit", value: s.to_owned() })
}

pub fn decode_tier(n: i64) -> Result<SourceTier> {
  let tier = u8::try_from(n)
    .map_err(|_| Error::Decode { column: "source_tier", value: n.to_string() })?;
  Ok(SourceTier::try_from(tier)?)
}

pub fn encode_raw_value(v: &RawValue) -> Result<String> { Ok(serde_json::to_string(v)?) }

// ─── Raw row types ───────────────────────────────────────────────────────────

/// Row from `players`.
pub struct RawPlayer {
  pub player_id:  String,
  pub name:       String,
  pub team:       Option<String>,
  pub position:   String,
  pub birth_date: Option<String>,
  pub created_at: String,
}

impl RawPlayer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      player_id:  row.get(0)?,
      name:       row.get(1)?,
      team:       row.get(2)?,
      position:   row.get(3)?,
      birth_date: row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_player(self) -> Result<Player> {
    Ok(Player {
      player_id:  self.player_id,
      name:       self.name,
      team:       self.team,
      position:   decode_position(&self.position)?,
      birth_date: self.birth_date.as_deref().map(decode_date).transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const PLAYER_COLUMNS: &str = "player_id, name, team, position, birth_date, created_at";

/// Row from `source_records`.
pub struct RawRecord {
  pub record_id:    String,
  pub player_id:    String,
  pub statistic_id: String,
  pub season_label: String,
  pub league:       String,
  pub value_json:   String,
  pub unit:         Option<String>,
  pub source_tier:  i64,
  pub source_url:   String,
  pub observed_at:  Option<String>,
  pub note:         Option<String>,
  pub recorded_at:  String,
}

pub const RECORD_COLUMNS: &str = "record_id, player_id, statistic_id, season_label, league, \
                                  value_json, unit, source_tier, source_url, observed_at, note, \
                                  recorded_at";

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:    row.get(0)?,
      player_id:    row.get(1)?,
      statistic_id: row.get(2)?,
      season_label: row.get(3)?,
      league:       row.get(4)?,
      value_json:   row.get(5)?,
      unit:         row.get(6)?,
      source_tier:  row.get(7)?,
      source_url:   row.get(8)?,
      observed_at:  row.get(9)?,
      note:         row.get(10)?,
      recorded_at:  row.get(11)?,
    })
  }

  pub fn into_record(self) -> Result<SourceRecord> {
    let season_label: SeasonLabel = self.season_label.parse()?;
    Ok(SourceRecord {
      record_id: self.record_id,
      player_id: self.player_id,
      statistic_id: self.statistic_id,
      season_label,
      league: self.league,
      value: serde_json::from_str(&self.value_json)?,
      unit: self.unit.as_deref().map(decode_unit).transpose()?,
      source_tier: decode_tier(self.source_tier)?,
      source_url: self.source_url,
      observed_at: self.observed_at.as_deref().map(decode_dt).transpose()?,
      note: self.note,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
