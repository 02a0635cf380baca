//! Player identity.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Playing position; selects the rating dimension set.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Position {
  #[strum(to_string = "forward", serialize = "f", serialize = "c", serialize = "lw", serialize = "rw")]
  Forward,
  #[strum(to_string = "defense", serialize = "d", serialize = "defence")]
  Defense,
  #[strum(to_string = "goalie", serialize = "g")]
  Goalie,
}

/// Input for [`crate::store::RecordStore::add_player`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
  pub player_id:  String,
  pub name:       String,
  pub team:       Option<String>,
  pub position:   Position,
  #[serde(default)]
  pub birth_date: Option<NaiveDate>,
}

impl NewPlayer {
  /// A player from a roster line; the id is the slug of `team first last`.
  pub fn from_roster(
    team: &str,
    first_name: &str,
    last_name: &str,
    position: Position,
    birth_date: Option<NaiveDate>,
  ) -> Self {
    let name = format!("{} {}", first_name.trim(), last_name.trim());
    Self {
      player_id: slugify(&format!("{team} {name}")),
      name,
      team: Some(team.trim().to_owned()).filter(|t| !t.is_empty()),
      position,
      birth_date,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
  pub player_id:  String,
  pub name:       String,
  pub team:       Option<String>,
  pub position:   Position,
  pub birth_date: Option<NaiveDate>,
  pub created_at: DateTime<Utc>,
}

impl Player {
  pub fn from_new(input: NewPlayer, created_at: DateTime<Utc>) -> Self {
    Self {
      player_id: input.player_id,
      name: input.name,
      team: input.team,
      position: input.position,
      birth_date: input.birth_date,
      created_at,
    }
  }

  /// Age in whole years on `date`.
  pub fn age_at(&self, date: NaiveDate) -> Option<u32> {
    let birth = self.birth_date?;
    let mut years = date.year() - birth.year();
    if (date.month(), date.day()) < (birth.month(), birth.day()) {
      years -= 1;
    }
    u32::try_from(years).ok()
  }
}

/// Lowercase ASCII slug with `_` separators: `"EDM Connor McDavid"` →
/// `"edm_connor_mcdavid"`.
pub fn slugify(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut pending_sep = false;
  for ch in s.chars() {
    if ch.is_ascii_alphanumeric() {
      if pending_sep && !out.is_empty() {
        out.push('_');
      }
      pending_sep = false;
      out.push(ch.to_ascii_lowercase());
    } else if ch.is_alphabetic() {
      // Non-ASCII letters are dropped rather than transliterated.
      continue;
    } else {
      pending_sep = true;
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn positions_parse_loosely() {
    assert_eq!("C".parse::<Position>().unwrap(), Position::Forward);
    assert_eq!("Defense".parse::<Position>().unwrap(), Position::Defense);
    assert_eq!("g".parse::<Position>().unwrap(), Position::Goalie);
    assert!("coach".parse::<Position>().is_err());
    assert_eq!(Position::Defense.to_string(), "defense");
  }

  #[test]
  fn roster_ids_are_slugs() {
    let p = NewPlayer::from_roster("Edmonton Oilers", "Connor", "McDavid", Position::Forward, None);
    assert_eq!(p.player_id, "edmonton_oilers_connor_mcdavid");
    assert_eq!(slugify("  St. Louis -- Blues "), "st_louis_blues");
  }

  #[test]
  fn age_respects_birthday() {
    let player = Player::from_new(
      NewPlayer {
        player_id:  "p".into(),
        name:       "P".into(),
        team:       None,
        position:   Position::Goalie,
        birth_date: NaiveDate::from_ymd_opt(2000, 10, 1),
      },
      Utc::now(),
    );
    assert_eq!(player.age_at(NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()), Some(23));
    assert_eq!(player.age_at(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()), Some(24));
  }
}
