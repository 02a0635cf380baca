//! Rating outputs and their bounded newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, player::Position};

/// Round half up on the magnitude.
fn round_half_up(x: f64) -> f64 {
  if x < 0.0 { -(-x + 0.5).floor() } else { (x + 0.5).floor() }
}

/// A 1–9 ability rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct Rating(u8);

impl Rating {
  pub const MIN: Rating = Rating(1);
  pub const MEDIAN: Rating = Rating(5);
  pub const MAX: Rating = Rating(9);

  pub fn get(&self) -> u8 { self.0 }

  /// Round half up and clamp into 1..=9. Non-finite input maps to the median.
  pub fn from_f64(x: f64) -> Self {
    if !x.is_finite() {
      return Self::MEDIAN;
    }
    Self(round_half_up(x).clamp(1.0, 9.0) as u8)
  }
}

impl TryFrom<u8> for Rating {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    if (1..=9).contains(&value) { Ok(Self(value)) } else { Err(Error::RatingOutOfRange(value)) }
  }
}

impl From<Rating> for u8 {
  fn from(value: Rating) -> Self { value.0 }
}

impl fmt::Display for Rating {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// A 0–100 confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct ConfidenceScore(u8);

impl ConfidenceScore {
  pub const ZERO: ConfidenceScore = ConfidenceScore(0);

  pub fn get(&self) -> u8 { self.0 }

  pub fn from_f64(x: f64) -> Self {
    if !x.is_finite() {
      return Self::ZERO;
    }
    Self(round_half_up(x).clamp(0.0, 100.0) as u8)
  }
}

impl TryFrom<u8> for ConfidenceScore {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    if value <= 100 { Ok(Self(value)) } else { Err(Error::ConfidenceOutOfRange(value)) }
  }
}

impl From<ConfidenceScore> for u8 {
  fn from(value: ConfidenceScore) -> Self { value.0 }
}

impl fmt::Display for ConfidenceScore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Exactly three rationale bullets: current evidence, projection basis, data
/// quality.
pub type Rationale = [String; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
  Current,
  /// Three to five seasons out.
  Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
  Rising,
  Flat,
  Declining,
  /// Fewer than two observed seasons.
  Unknown,
}

/// One rated metric for the most recent season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
  pub metric:  String,
  pub weight:  u8,
  /// The metric value the stanine was computed from, as displayed.
  pub value:   Option<String>,
  /// `None` when the metric is unavailable.
  pub stanine: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingResult {
  pub position:           Position,
  pub dimensions:         Vec<DimensionScore>,
  pub current_rating:     Rating,
  pub future_rating:      Rating,
  pub current_confidence: ConfidenceScore,
  pub future_confidence:  ConfidenceScore,
  pub trend:              Trend,
  pub rationale:          Rationale,
}
