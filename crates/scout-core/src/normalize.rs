//! The unit & format normalizer.
//!
//! Pure functions that coerce a source's raw value into the canonical
//! [`StatValue`] for a declared unit class. Rounding is always round-half-up
//! on exact decimal digits. Anything that cannot be coerced is rejected with
//! a [`FormatError`]; nothing is ever silently zeroed.
//!
//! Normalization is idempotent: feeding the rendered canonical text back in
//! yields the same value.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::{
  catalog,
  fact::NormalizedRecord,
  record::SourceRecord,
  value::{ContractTerm, Fixed, RawValue, StatValue, div_round_half_up, parse_decimal, rescale},
};

// ─── Unit classes ────────────────────────────────────────────────────────────

/// The declared unit of a statistic; selects the canonical form.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnitClass {
  Count,
  SavePct,
  GoalRate,
  Percent,
  TimeOnIce,
  Currency,
  Term,
  Text,
}

impl UnitClass {
  /// Decimal places kept for fixed-point units.
  pub fn scale(&self) -> Option<u8> {
    match self {
      Self::SavePct => Some(3),
      Self::GoalRate => Some(2),
      Self::Percent => Some(1),
      _ => None,
    }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A raw value that cannot be coerced into its declared unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot normalize {input:?} as {unit}: {reason}")]
pub struct FormatError {
  pub unit:   UnitClass,
  pub input:  String,
  pub reason: String,
}

impl FormatError {
  fn new(unit: UnitClass, input: &str, reason: impl Into<String>) -> Self {
    Self { unit, input: input.to_owned(), reason: reason.into() }
  }
}

type Result<T> = std::result::Result<T, FormatError>;

// ─── Entry points ────────────────────────────────────────────────────────────

/// Normalize `raw` into the canonical form for `unit`.
pub fn normalize(raw: &RawValue, unit: UnitClass) -> Result<StatValue> {
  if matches!(raw, RawValue::Float(x) if !x.is_finite()) {
    return Err(FormatError::new(unit, &raw.as_text(), "not a finite number"));
  }
  let text = raw.as_text();
  match unit {
    UnitClass::Count => count(&text),
    UnitClass::SavePct => save_pct(&text),
    UnitClass::GoalRate => fixed(&text, UnitClass::GoalRate).map(StatValue::GoalRate),
    UnitClass::Percent => {
      let body = text.strip_suffix('%').unwrap_or(&text);
      fixed(body, UnitClass::Percent)
        .map(StatValue::Percent)
        .map_err(|e| FormatError { input: text.clone(), ..e })
    }
    UnitClass::TimeOnIce => time_on_ice(&text),
    UnitClass::Currency => currency(&text),
    UnitClass::Term => term(raw, &text),
    UnitClass::Text => plain_text(&text),
  }
}

/// Normalize a stored record using its explicit unit, or the catalog's unit
/// for its statistic.
pub fn normalize_record(record: &SourceRecord) -> Result<NormalizedRecord> {
  let unit = record
    .unit
    .or_else(|| catalog::lookup(&record.statistic_id).map(|def| def.unit))
    .ok_or_else(|| {
      FormatError::new(
        UnitClass::Text,
        &record.value.as_text(),
        format!("unknown statistic {:?} and no unit declared", record.statistic_id),
      )
    })?;
  let value = normalize(&record.value, unit)?;
  Ok(NormalizedRecord { record: record.clone(), value })
}

// ─── Per-unit coercion ───────────────────────────────────────────────────────

fn strip_grouping(s: &str) -> String {
  s.chars().filter(|c| *c != ',' && *c != '_' && !c.is_whitespace()).collect()
}

fn decimal(s: &str, unit: UnitClass, original: &str) -> Result<(i128, u32)> {
  parse_decimal(s).ok_or_else(|| FormatError::new(unit, original, "not a number"))
}

fn out_of_range(unit: UnitClass, original: &str) -> FormatError {
  FormatError::new(unit, original, "out of range")
}

fn to_i64(n: i128, unit: UnitClass, original: &str) -> Result<i64> {
  i64::try_from(n).map_err(|_| out_of_range(unit, original))
}

fn rescaled(digits: i128, scale: u32, target: u32, unit: UnitClass, original: &str) -> Result<i128> {
  rescale(digits, scale, target).ok_or_else(|| out_of_range(unit, original))
}

fn count(text: &str) -> Result<StatValue> {
  let (digits, scale) = decimal(&strip_grouping(text), UnitClass::Count, text)?;
  let divisor = 10_i128.pow(scale);
  if digits % divisor != 0 {
    return Err(FormatError::new(UnitClass::Count, text, "counts must be whole numbers"));
  }
  Ok(StatValue::Count(to_i64(digits / divisor, UnitClass::Count, text)?))
}

fn fixed(text: &str, unit: UnitClass) -> Result<Fixed> {
  let scale = unit.scale().unwrap_or(0);
  let (digits, s) = decimal(&strip_grouping(text), unit, text)?;
  let units = to_i64(rescaled(digits, s, u32::from(scale), unit, text)?, unit, text)?;
  Ok(Fixed::new(units, scale))
}

fn save_pct(text: &str) -> Result<StatValue> {
  let unit = UnitClass::SavePct;
  let (body, percent) = match text.strip_suffix('%') {
    Some(body) => (body, true),
    None => (text, false),
  };
  let (digits, mut scale) = decimal(&strip_grouping(body), unit, text)?;
  if percent {
    scale += 2;
  }
  if digits < 0 {
    return Err(FormatError::new(unit, text, "save percentage cannot be negative"));
  }
  let units = rescaled(digits, scale, 3, unit, text)?;
  if units > 1000 {
    return Err(FormatError::new(unit, text, "save percentage above 1.000"));
  }
  Ok(StatValue::SavePct(Fixed::new(to_i64(units, unit, text)?, 3)))
}

fn time_on_ice(text: &str) -> Result<StatValue> {
  let unit = UnitClass::TimeOnIce;
  let seconds = match text.split_once(':') {
    Some((minutes, seconds)) => {
      let minutes: u32 = minutes
        .trim()
        .parse()
        .map_err(|_| FormatError::new(unit, text, "minutes are not a whole number"))?;
      let (digits, scale) = decimal(seconds, unit, text)?;
      if seconds.trim().starts_with('-') || digits >= 60 * 10_i128.pow(scale) {
        return Err(FormatError::new(unit, text, "seconds must be between 0 and 59"));
      }
      // Fractional seconds round half up and may carry into the next minute.
      i128::from(minutes) * 60 + rescaled(digits, scale, 0, unit, text)?
    }
    None => {
      // Decimal minutes, e.g. 18.53.
      let (digits, scale) = decimal(text, unit, text)?;
      let scaled = digits.checked_mul(60).ok_or_else(|| out_of_range(unit, text))?;
      div_round_half_up(scaled, 10_i128.pow(scale))
    }
  };
  if seconds < 0 {
    return Err(FormatError::new(unit, text, "time on ice cannot be negative"));
  }
  u32::try_from(seconds)
    .map(StatValue::TimeOnIce)
    .map_err(|_| FormatError::new(unit, text, "out of range"))
}

fn currency(text: &str) -> Result<StatValue> {
  let unit = UnitClass::Currency;
  let mut body = strip_grouping(text);
  if let Some(rest) = body.strip_prefix("USD") {
    body = rest.to_owned();
  }
  if let Some(rest) = body.strip_prefix('$') {
    body = rest.to_owned();
  }
  let (body, multiplier) = match body.chars().last().map(|c| c.to_ascii_uppercase()) {
    Some('K') => (&body[..body.len() - 1], 3),
    Some('M') => (&body[..body.len() - 1], 6),
    Some('B') => (&body[..body.len() - 1], 9),
    _ => (body.as_str(), 0),
  };
  let (digits, scale) = decimal(body, unit, text)?;
  if digits < 0 {
    return Err(FormatError::new(unit, text, "amounts cannot be negative"));
  }
  let scaled = digits
    .checked_mul(10_i128.pow(multiplier))
    .ok_or_else(|| out_of_range(unit, text))?;
  let dollars = rescaled(scaled, scale, 0, unit, text)?;
  Ok(StatValue::Currency(to_i64(dollars, unit, text)?))
}

/// Longest span a contract term may cover, in years.
const MAX_TERM_YEARS: u16 = 15;

fn term(raw: &RawValue, text: &str) -> Result<StatValue> {
  let unit = UnitClass::Term;
  if !matches!(raw, RawValue::Text(_)) {
    return Err(FormatError::new(unit, text, "contract terms must be text like 2021-29"));
  }
  let normalized = text.replace(" to ", "-").replace(['\u{2013}', '\u{2014}'], "-");
  let (start, end) = normalized
    .split_once('-')
    .ok_or_else(|| FormatError::new(unit, text, "expected a YYYY-YY span"))?;
  let (start, end) = (start.trim(), end.trim());
  if start.len() != 4 || !(end.len() == 2 || end.len() == 4) {
    return Err(FormatError::new(unit, text, "expected a YYYY-YY span"));
  }
  let start: u16 = start
    .parse()
    .map_err(|_| FormatError::new(unit, text, "start year is not a number"))?;
  let end_digits: u16 = end
    .parse()
    .map_err(|_| FormatError::new(unit, text, "end year is not a number"))?;
  let end = if end.len() == 4 {
    end_digits
  } else {
    let century = start - start % 100;
    if end_digits < start % 100 { century + 100 + end_digits } else { century + end_digits }
  };
  if end < start {
    return Err(FormatError::new(unit, text, "contract ends before it starts"));
  }
  if end - start > MAX_TERM_YEARS {
    return Err(FormatError::new(unit, text, "contract span is implausibly long"));
  }
  Ok(StatValue::Term(ContractTerm { start, end }))
}

fn plain_text(text: &str) -> Result<StatValue> {
  let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
  if collapsed.is_empty() {
    return Err(FormatError::new(UnitClass::Text, text, "empty text"));
  }
  Ok(StatValue::Text(collapsed))
}
