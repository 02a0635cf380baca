//! Roster CSV import.
//!
//! Expected header: `team_name,firstName,lastName,position[,birth_date]`.
//! Player ids are slugs of `team first last`.

use std::{collections::HashSet, io::Read, path::Path};

use anyhow::Context as _;
use chrono::NaiveDate;
use scout_core::player::{NewPlayer, Position};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct RosterRow {
  team_name:  String,
  #[serde(rename = "firstName")]
  first_name: String,
  #[serde(rename = "lastName")]
  last_name:  String,
  position:   String,
  #[serde(default)]
  birth_date: Option<String>,
}

/// A roster line that could not be turned into a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
  /// 1-based data row, not counting the header.
  pub row:    usize,
  pub reason: String,
}

#[derive(Debug, Default)]
pub struct Roster {
  pub players: Vec<NewPlayer>,
  pub skipped: Vec<SkippedRow>,
}

pub fn read_roster(path: &Path) -> anyhow::Result<Roster> {
  let file = std::fs::File::open(path)
    .with_context(|| format!("failed to open roster {}", path.display()))?;
  parse_roster(file).with_context(|| format!("failed to parse roster {}", path.display()))
}

pub fn parse_roster(reader: impl Read) -> anyhow::Result<Roster> {
  let mut reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .flexible(true)
    .from_reader(reader);

  let mut roster = Roster::default();
  let mut seen = HashSet::new();
  for (idx, result) in reader.deserialize::<RosterRow>().enumerate() {
    let row = idx + 1;
    let mut skip = |reason: String| {
      warn!(row, reason = %reason, "skipping roster row");
      roster.skipped.push(SkippedRow { row, reason });
    };

    let line = match result {
      Ok(line) => line,
      Err(e) => {
        skip(e.to_string());
        continue;
      }
    };
    let Ok(position) = line.position.parse::<Position>() else {
      skip(format!("unknown position {:?}", line.position));
      continue;
    };
    let birth_date = match line.birth_date.as_deref().filter(|s| !s.is_empty()) {
      None => None,
      Some(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
          skip(format!("invalid birth_date {s:?}"));
          continue;
        }
      },
    };
    if line.first_name.is_empty() && line.last_name.is_empty() {
      skip("missing name".to_owned());
      continue;
    }

    let player =
      NewPlayer::from_roster(&line.team_name, &line.first_name, &line.last_name, position, birth_date);
    if !seen.insert(player.player_id.clone()) {
      skip(format!("duplicate player id {}", player.player_id));
      continue;
    }
    roster.players.push(player);
  }
  Ok(roster)
}
