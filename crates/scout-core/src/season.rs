//! Season labels.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A hockey season identified by its start year; renders as `2024-25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Season(u16);

impl Season {
  pub const fn new(start_year: u16) -> Self { Self(start_year) }

  pub fn start_year(&self) -> u16 { self.0 }

  pub fn previous(&self) -> Self { Self(self.0.saturating_sub(1)) }

  /// The season `n` years before this one.
  pub fn back(&self, n: u16) -> Self { Self(self.0.saturating_sub(n)) }

  /// Number of seasons from `self` forward to `later` (zero if `later` is
  /// not after `self`).
  pub fn seasons_until(&self, later: Season) -> u16 { later.0.saturating_sub(self.0) }
}

impl fmt::Display for Season {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{:02}", self.0, (self.0 + 1) % 100)
  }
}

impl FromStr for Season {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || Error::InvalidSeason(s.to_owned());
    let normalized = s.trim().replace(['\u{2013}', '\u{2014}', '/'], "-");
    let (start, end) = normalized.split_once('-').ok_or_else(invalid)?;
    if start.len() != 4 {
      return Err(invalid());
    }
    let start: u16 = start.parse().map_err(|_| invalid())?;
    let expected = start + 1;
    let matches = match end.len() {
      2 => end.parse::<u16>().map_err(|_| invalid())? == expected % 100,
      4 => end.parse::<u16>().map_err(|_| invalid())? == expected,
      _ => false,
    };
    if !matches {
      return Err(invalid());
    }
    Ok(Self(start))
  }
}

impl From<Season> for String {
  fn from(value: Season) -> Self { value.to_string() }
}

impl TryFrom<String> for Season {
  type Error = Error;

  fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

// ─── SeasonLabel ─────────────────────────────────────────────────────────────

/// The season a record describes: a specific season, or an explicitly
/// reported career total. Seasons sort before `career`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SeasonLabel {
  Season(Season),
  Career,
}

impl SeasonLabel {
  pub fn season(&self) -> Option<Season> {
    match self {
      Self::Season(s) => Some(*s),
      Self::Career => None,
    }
  }
}

impl fmt::Display for SeasonLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Season(s) => write!(f, "{s}"),
      Self::Career => f.write_str("career"),
    }
  }
}

impl FromStr for SeasonLabel {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.trim().eq_ignore_ascii_case("career") {
      Ok(Self::Career)
    } else {
      s.parse().map(Self::Season)
    }
  }
}

impl From<Season> for SeasonLabel {
  fn from(value: Season) -> Self { Self::Season(value) }
}

impl From<SeasonLabel> for String {
  fn from(value: SeasonLabel) -> Self { value.to_string() }
}

impl TryFrom<String> for SeasonLabel {
  type Error = Error;

  fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}
