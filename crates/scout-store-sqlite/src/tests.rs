//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use scout_core::{
  catalog::{GOALS, SAVE_PCT},
  normalize::UnitClass,
  player::{NewPlayer, Position},
  profile::ContractSummary,
  rating::{ConfidenceScore, Rating, Trend},
  record::{NewSourceRecord, SourceTier},
  report::{EvaluationOutput, SCHEMA_VERSION},
  row::{Cell, GapReason},
  season::{Season, SeasonLabel},
  store::{AddOutcome, RecordStore},
  value::RawValue,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn forward(id: &str) -> NewPlayer {
  NewPlayer {
    player_id:  id.to_owned(),
    name:       "Test Forward".to_owned(),
    team:       Some("EDM".to_owned()),
    position:   Position::Forward,
    birth_date: NaiveDate::from_ymd_opt(1997, 1, 13),
  }
}

fn goals(player_id: &str, season: u16, value: i64, tier: SourceTier) -> NewSourceRecord {
  NewSourceRecord::new(
    player_id,
    GOALS,
    Season::new(season).into(),
    "NHL",
    value,
    tier,
    "https://www.nhl.com/stats",
  )
}

// ─── Players ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_player() {
  let s = store().await;

  let player = s.add_player(forward("edm_test_forward")).await.unwrap();
  assert_eq!(player.position, Position::Forward);

  let fetched = s.get_player("edm_test_forward").await.unwrap().unwrap();
  assert_eq!(fetched.player_id, player.player_id);
  assert_eq!(fetched.team.as_deref(), Some("EDM"));
  assert_eq!(fetched.birth_date, NaiveDate::from_ymd_opt(1997, 1, 13));
}

#[tokio::test]
async fn get_player_missing_returns_none() {
  let s = store().await;
  assert!(s.get_player("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn add_player_twice_errors() {
  let s = store().await;
  s.add_player(forward("dup")).await.unwrap();
  let err = s.add_player(forward("dup")).await.unwrap_err();
  assert!(matches!(err, crate::Error::PlayerExists(_)));
}

#[tokio::test]
async fn list_players_filtered_by_position() {
  let s = store().await;
  s.add_player(forward("b_forward")).await.unwrap();
  s.add_player(forward("a_forward")).await.unwrap();
  s.add_player(NewPlayer { position: Position::Goalie, ..forward("c_goalie") }).await.unwrap();

  let all = s.list_players(None).await.unwrap();
  let ids: Vec<_> = all.iter().map(|p| p.player_id.as_str()).collect();
  assert_eq!(ids, ["a_forward", "b_forward", "c_goalie"]);

  let goalies = s.list_players(Some(Position::Goalie)).await.unwrap();
  assert_eq!(goalies.len(), 1);
  assert_eq!(goalies[0].player_id, "c_goalie");
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_record_and_snapshot_in_insertion_order() {
  let s = store().await;
  s.add_player(forward("p")).await.unwrap();

  let first = s.add_record(goals("p", 2024, 42, SourceTier::Official)).await.unwrap();
  let second = s.add_record(goals("p", 2024, 40, SourceTier::Aggregator)).await.unwrap();
  let third = s.add_record(goals("p", 2023, 30, SourceTier::Official)).await.unwrap();
  assert!(first.is_inserted() && second.is_inserted() && third.is_inserted());

  let snapshot = s.snapshot("p").await.unwrap();
  let ids: Vec<_> = snapshot.iter().map(|r| r.record_id.clone()).collect();
  assert_eq!(ids, [
    first.record().record_id.clone(),
    second.record().record_id.clone(),
    third.record().record_id.clone(),
  ]);
  assert_eq!(snapshot[1].source_tier, SourceTier::Aggregator);
}

#[tokio::test]
async fn identical_record_is_a_duplicate() {
  let s = store().await;
  s.add_player(forward("p")).await.unwrap();

  let first = s.add_record(goals("p", 2024, 42, SourceTier::Official)).await.unwrap();
  let again = s.add_record(goals("p", 2024, 42, SourceTier::Official)).await.unwrap();

  let AddOutcome::Duplicate(existing) = again else {
    panic!("expected duplicate, got {again:?}");
  };
  assert_eq!(&existing, first.record());
  assert_eq!(s.snapshot("p").await.unwrap().len(), 1);
}

#[tokio::test]
async fn record_for_unknown_player_errors() {
  let s = store().await;
  let err = s.add_record(goals("ghost", 2024, 1, SourceTier::Official)).await.unwrap_err();
  assert!(matches!(err, crate::Error::PlayerNotFound(ref id) if id == "ghost"));
}

#[tokio::test]
async fn record_fields_roundtrip() {
  let s = store().await;
  s.add_player(NewPlayer { position: Position::Goalie, ..forward("g") }).await.unwrap();

  let observed = Utc.with_ymd_and_hms(2025, 4, 18, 12, 0, 0).unwrap();
  let input = NewSourceRecord::new(
    "g",
    SAVE_PCT,
    SeasonLabel::Career,
    "NHL",
    "91.5%",
    SourceTier::Authority,
    "https://www.hockey-reference.com/players/x",
  )
  .unit(UnitClass::SavePct)
  .observed_at(observed)
  .note("regular season only");
  s.add_record(input).await.unwrap();

  let stored = s.records_for("g", SAVE_PCT, SeasonLabel::Career).await.unwrap();
  assert_eq!(stored.len(), 1);
  let record = &stored[0];
  assert_eq!(record.value, RawValue::from("91.5%"));
  assert_eq!(record.unit, Some(UnitClass::SavePct));
  assert_eq!(record.observed_at, Some(observed));
  assert_eq!(record.note.as_deref(), Some("regular season only"));
  assert_eq!(record.season_label, SeasonLabel::Career);
}

#[tokio::test]
async fn records_for_filters_by_statistic_and_season() {
  let s = store().await;
  s.add_player(forward("p")).await.unwrap();
  s.add_record(goals("p", 2024, 42, SourceTier::Official)).await.unwrap();
  s.add_record(goals("p", 2023, 30, SourceTier::Official)).await.unwrap();

  let found = s.records_for("p", GOALS, Season::new(2023).into()).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].value, RawValue::Integer(30));
  assert!(s.records_for("p", SAVE_PCT, Season::new(2023).into()).await.unwrap().is_empty());
}

// ─── Evaluations ─────────────────────────────────────────────────────────────

fn evaluation(player_id: &str) -> EvaluationOutput {
  let gap = Cell::gap(GapReason::NoRecord);
  EvaluationOutput {
    evaluation_id:            Uuid::new_v4(),
    schema_version:           SCHEMA_VERSION.to_owned(),
    engine_version:           "0.0.0".to_owned(),
    generated_at:             Utc::now(),
    player_id:                player_id.to_owned(),
    player_name:              "Test Forward".to_owned(),
    position:                 Position::Forward,
    current_rating:           Rating::MEDIAN,
    future_rating:            Rating::MEDIAN,
    current_confidence:       ConfidenceScore::ZERO,
    future_confidence:        ConfidenceScore::ZERO,
    reasoning:                ["a".to_owned(), "b".to_owned(), "c".to_owned()],
    trend:                    Trend::Unknown,
    dimensions:               Vec::new(),
    contract:                 ContractSummary { cap_hit: gap.clone(), term: gap.clone(), status: gap },
    season_tables:            BTreeMap::new(),
    unresolved_discrepancies: Vec::new(),
    diagnostics:              Vec::new(),
  }
}

#[tokio::test]
async fn evaluations_append_in_order() {
  let s = store().await;
  s.add_player(forward("p")).await.unwrap();

  let first = evaluation("p");
  let second = evaluation("p");
  s.record_evaluation(&first).await.unwrap();
  s.record_evaluation(&second).await.unwrap();

  let history = s.evaluations("p").await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0].evaluation_id, first.evaluation_id);
  assert_eq!(history[1], second);
  assert!(s.evaluations("other").await.unwrap().is_empty());
}

#[tokio::test]
async fn file_store_persists_across_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("scout.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.add_player(forward("p")).await.unwrap();
    s.add_record(goals("p", 2024, 42, SourceTier::Official)).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.get_player("p").await.unwrap().is_some());
  assert_eq!(s.snapshot("p").await.unwrap().len(), 1);
}
