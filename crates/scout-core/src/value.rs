//! Value types — raw inputs as sources report them, and the canonical typed
//! values the normalizer produces.
//!
//! Numeric values are held as scaled integers (`Fixed`), never as binary
//! floats, so canonical output is bit-exact and comparable across players.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, normalize::UnitClass};

// ─── Decimal helpers ─────────────────────────────────────────────────────────

/// Parse a plain decimal string (`"-12.345"`, `".915"`, `"7"`) into its
/// digits and scale. No exponent, no separators.
pub(crate) fn parse_decimal(s: &str) -> Option<(i128, u32)> {
  let s = s.trim();
  let (negative, s) = match s.strip_prefix('-') {
    Some(rest) => (true, rest),
    None => (false, s.strip_prefix('+').unwrap_or(s)),
  };
  let (whole, frac) = match s.split_once('.') {
    Some((w, f)) => (w, f),
    None => (s, ""),
  };
  if whole.is_empty() && frac.is_empty() {
    return None;
  }
  if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
    return None;
  }
  if whole.len() + frac.len() > 30 {
    return None;
  }
  let digits: String = format!("{whole}{frac}");
  let magnitude: i128 = digits.parse().ok()?;
  let scale = frac.len() as u32;
  Some((if negative { -magnitude } else { magnitude }, scale))
}

/// Integer division rounding half away from zero ("round half up" on the
/// magnitude). `denominator` must be positive.
pub fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
  debug_assert!(denominator > 0);
  let (n, d) = (numerator.unsigned_abs(), denominator.unsigned_abs());
  let (quotient, remainder) = (n / d, n % d);
  let magnitude = if remainder >= d - remainder { quotient + 1 } else { quotient };
  let magnitude = i128::try_from(magnitude).unwrap_or(i128::MAX);
  if numerator < 0 { -magnitude } else { magnitude }
}

/// Re-express `(digits, scale)` at `target` decimal places, rounding half up
/// when precision is dropped. `None` on overflow.
pub(crate) fn rescale(digits: i128, scale: u32, target: u32) -> Option<i128> {
  if scale > target {
    Some(div_round_half_up(digits, 10_i128.checked_pow(scale - target)?))
  } else {
    digits.checked_mul(10_i128.checked_pow(target - scale)?)
  }
}

// ─── Fixed ───────────────────────────────────────────────────────────────────

/// An exact decimal: `units × 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fixed {
  units: i64,
  scale: u8,
}

impl Fixed {
  pub const fn new(units: i64, scale: u8) -> Self { Self { units, scale } }

  pub fn units(&self) -> i64 { self.units }

  pub fn scale(&self) -> u8 { self.scale }

  pub fn is_zero(&self) -> bool { self.units == 0 }

  pub fn to_f64(&self) -> f64 {
    self.units as f64 / 10_f64.powi(i32::from(self.scale))
  }

  /// Parse the plain decimal form produced by `Display`.
  pub fn parse(s: &str) -> Option<Self> {
    let (digits, scale) = parse_decimal(s)?;
    let units = i64::try_from(digits).ok()?;
    Some(Self { units, scale: u8::try_from(scale).ok()? })
  }
}

impl fmt::Display for Fixed {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.units < 0 { "-" } else { "" };
    let magnitude = self.units.unsigned_abs();
    if self.scale == 0 {
      return write!(f, "{sign}{magnitude}");
    }
    let divisor = 10_u64.pow(u32::from(self.scale));
    write!(
      f,
      "{sign}{}.{:0width$}",
      magnitude / divisor,
      magnitude % divisor,
      width = usize::from(self.scale)
    )
  }
}

impl From<Fixed> for String {
  fn from(value: Fixed) -> Self { value.to_string() }
}

impl TryFrom<String> for Fixed {
  type Error = Error;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Fixed::parse(&value).ok_or(Error::InvalidDecimal(value))
  }
}

// ─── Raw values ──────────────────────────────────────────────────────────────

/// A value exactly as a source reported it, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
  Integer(i64),
  Float(f64),
  Text(String),
}

impl RawValue {
  /// The textual form the normalizer works on. Floats use Rust's shortest
  /// round-trip representation, so `0.9145` is seen as `"0.9145"`.
  pub fn as_text(&self) -> String {
    match self {
      Self::Integer(n) => n.to_string(),
      Self::Float(x) => x.to_string(),
      Self::Text(s) => s.trim().to_owned(),
    }
  }
}

impl From<i64> for RawValue {
  fn from(value: i64) -> Self { Self::Integer(value) }
}

impl From<f64> for RawValue {
  fn from(value: f64) -> Self { Self::Float(value) }
}

impl From<&str> for RawValue {
  fn from(value: &str) -> Self { Self::Text(value.to_owned()) }
}

// ─── Contract term ───────────────────────────────────────────────────────────

/// The span of a contract, first and last season start years inclusive of
/// the final season's end year (`2021–29` covers 2021-22 through 2028-29).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractTerm {
  pub start: u16,
  pub end:   u16,
}

impl fmt::Display for ContractTerm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}\u{2013}{:02}", self.start, self.end % 100)
  }
}

// ─── StatValue ───────────────────────────────────────────────────────────────

/// A canonical, unit-typed statistic value. Equality is exact: two values are
/// equal only if they normalize to the same digits in the same unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum StatValue {
  Count(i64),
  /// Three decimal places, rendered without the leading zero (`.915`).
  SavePct(Fixed),
  /// Two decimal places (`2.46`).
  GoalRate(Fixed),
  /// One decimal place, rendered with a percent sign (`12.3%`).
  Percent(Fixed),
  /// Whole seconds, rendered `m:ss`.
  TimeOnIce(u32),
  /// Whole US dollars.
  Currency(i64),
  Term(ContractTerm),
  Text(String),
}

impl StatValue {
  pub fn unit(&self) -> UnitClass {
    match self {
      Self::Count(_) => UnitClass::Count,
      Self::SavePct(_) => UnitClass::SavePct,
      Self::GoalRate(_) => UnitClass::GoalRate,
      Self::Percent(_) => UnitClass::Percent,
      Self::TimeOnIce(_) => UnitClass::TimeOnIce,
      Self::Currency(_) => UnitClass::Currency,
      Self::Term(_) => UnitClass::Term,
      Self::Text(_) => UnitClass::Text,
    }
  }

  pub fn is_zero(&self) -> bool {
    self.scaled_units() == Some(0)
  }

  /// The integer the value is stored as at its unit's scale, for numeric
  /// units. `None` for terms and text.
  pub fn scaled_units(&self) -> Option<i64> {
    match self {
      Self::Count(n) | Self::Currency(n) => Some(*n),
      Self::SavePct(x) | Self::GoalRate(x) | Self::Percent(x) => Some(x.units()),
      Self::TimeOnIce(secs) => Some(i64::from(*secs)),
      Self::Term(_) | Self::Text(_) => None,
    }
  }

  /// Build a value of the same unit from scaled units (see
  /// [`Self::scaled_units`]).
  pub fn with_scaled_units(&self, units: i64) -> Option<Self> {
    Some(match self {
      Self::Count(_) => Self::Count(units),
      Self::Currency(_) => Self::Currency(units),
      Self::SavePct(x) => Self::SavePct(Fixed::new(units, x.scale())),
      Self::GoalRate(x) => Self::GoalRate(Fixed::new(units, x.scale())),
      Self::Percent(x) => Self::Percent(Fixed::new(units, x.scale())),
      Self::TimeOnIce(_) => Self::TimeOnIce(u32::try_from(units).ok()?),
      Self::Term(_) | Self::Text(_) => return None,
    })
  }

  /// The value as a float in its natural reading unit. Time on ice is in
  /// minutes. Used only for comparisons against rating benchmarks.
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Count(n) | Self::Currency(n) => Some(*n as f64),
      Self::SavePct(x) | Self::GoalRate(x) | Self::Percent(x) => Some(x.to_f64()),
      Self::TimeOnIce(secs) => Some(f64::from(*secs) / 60.0),
      Self::Term(_) | Self::Text(_) => None,
    }
  }
}

impl fmt::Display for StatValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Count(n) => write!(f, "{n}"),
      Self::SavePct(x) => {
        let rendered = x.to_string();
        match rendered.strip_prefix("0.") {
          Some(rest) => write!(f, ".{rest}"),
          None => f.write_str(&rendered),
        }
      }
      Self::GoalRate(x) => write!(f, "{x}"),
      Self::Percent(x) => write!(f, "{x}%"),
      Self::TimeOnIce(secs) => write!(f, "{}:{:02}", secs / 60, secs % 60),
      Self::Currency(dollars) => {
        let sign = if *dollars < 0 { "-" } else { "" };
        write!(f, "{sign}${}", group_thousands(dollars.unsigned_abs()))
      }
      Self::Term(term) => write!(f, "{term}"),
      Self::Text(s) => f.write_str(s),
    }
  }
}

fn group_thousands(n: u64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(ch);
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_display_pads_fraction() {
    assert_eq!(Fixed::new(915, 3).to_string(), "0.915");
    assert_eq!(Fixed::new(5, 2).to_string(), "0.05");
    assert_eq!(Fixed::new(-1234, 2).to_string(), "-12.34");
    assert_eq!(Fixed::new(42, 0).to_string(), "42");
  }

  #[test]
  fn fixed_parses_its_own_display() {
    let x = Fixed::new(-305, 2);
    assert_eq!(Fixed::parse(&x.to_string()), Some(x));
    assert_eq!(Fixed::parse(".915"), Some(Fixed::new(915, 3)));
    assert_eq!(Fixed::parse("1e3"), None);
  }

  #[test]
  fn half_up_rounding_on_magnitude() {
    assert_eq!(div_round_half_up(9145, 10), 915);
    assert_eq!(div_round_half_up(9144, 10), 914);
    assert_eq!(div_round_half_up(-25, 10), -3);
    assert_eq!(div_round_half_up(i128::MAX, 2), i128::MAX / 2 + 1);
    assert_eq!(rescale(12, 0, 2), Some(1200));
    assert_eq!(rescale(12_345, 3, 1), Some(123));
    assert_eq!(rescale(i128::MAX / 10, 0, 2), None);
  }

  #[test]
  fn stat_value_rendering() {
    assert_eq!(StatValue::SavePct(Fixed::new(915, 3)).to_string(), ".915");
    assert_eq!(StatValue::SavePct(Fixed::new(1000, 3)).to_string(), "1.000");
    assert_eq!(StatValue::Percent(Fixed::new(123, 1)).to_string(), "12.3%");
    assert_eq!(StatValue::TimeOnIce(1112).to_string(), "18:32");
    assert_eq!(StatValue::Currency(8_700_000).to_string(), "$8,700,000");
    assert_eq!(StatValue::Currency(950).to_string(), "$950");
    assert_eq!(
      StatValue::Term(ContractTerm { start: 2021, end: 2029 }).to_string(),
      "2021\u{2013}29"
    );
  }

  #[test]
  fn stat_value_serializes_fixed_as_string() {
    let json = serde_json::to_value(StatValue::GoalRate(Fixed::new(246, 2))).unwrap();
    assert_eq!(json, serde_json::json!({ "unit": "goal_rate", "value": "2.46" }));
    let back: StatValue = serde_json::from_value(json).unwrap();
    assert_eq!(back, StatValue::GoalRate(Fixed::new(246, 2)));
  }
}
