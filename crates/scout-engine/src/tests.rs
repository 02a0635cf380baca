//! End-to-end tests for the evaluation pipeline against an in-memory store.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use scout_core::{
  catalog::{CORSI_FOR_PCT, FACEOFF_PCT, GAMES_PLAYED, GOALS, POINTS, SAVE_PCT, SHOOTING_PCT, TOI_PER_GAME},
  fact::{RejectReason, Resolution},
  player::{NewPlayer, Player, Position},
  profile::{Direction, QualitativeSignal, SignalKind},
  rating::Trend,
  record::{NewSourceRecord, SourceTier},
  report::{Diagnostic, DiscrepancyKind},
  row::{Cell, MOST_RECENT},
  season::Season,
  store::RecordStore,
  value::{RawValue, StatValue},
};
use scout_store_sqlite::SqliteStore;

use crate::{
  EngineConfig, Error, Evaluator,
  ingest::{self, ProviderError, ProviderStatus, RecordProvider},
};

const PLAYER: &str = "edm_test_forward";

fn config() -> EngineConfig {
  EngineConfig { current_season: Season::new(2024), ..EngineConfig::default() }
}

async fn store_with(position: Position) -> Arc<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  store
    .add_player(NewPlayer {
      player_id: PLAYER.to_owned(),
      name: "Test Forward".to_owned(),
      team: Some("EDM".to_owned()),
      position,
      birth_date: NaiveDate::from_ymd_opt(1999, 3, 1),
    })
    .await
    .expect("player");
  Arc::new(store)
}

fn record(stat: &str, season: u16, value: i64, tier: SourceTier, url: &str) -> NewSourceRecord {
  NewSourceRecord::new(PLAYER, stat, Season::new(season).into(), "NHL", value, tier, url)
}

fn official(stat: &str, season: u16, value: i64) -> NewSourceRecord {
  record(stat, season, value, SourceTier::Official, "https://www.nhl.com/player/1")
}

async fn add_season(store: &SqliteStore, season: u16, gp: i64, goals: i64, points: i64) {
  for input in [
    official(GAMES_PLAYED, season, gp),
    official(GOALS, season, goals),
    official(POINTS, season, points),
  ] {
    store.add_record(input).await.unwrap();
  }
}

/// Tier-1 values for every rated forward metric in one season.
async fn add_full_season(store: &SqliteStore, season: u16) {
  add_season(store, season, 82, 30, 65).await;
  let rates: [(&str, RawValue); 4] = [
    (SHOOTING_PCT, "12.5".into()),
    (CORSI_FOR_PCT, "53.0".into()),
    (TOI_PER_GAME, "18:30".into()),
    (FACEOFF_PCT, "51.2".into()),
  ];
  for (stat, value) in rates {
    let input = NewSourceRecord::new(
      PLAYER,
      stat,
      Season::new(season).into(),
      "NHL",
      value,
      SourceTier::Official,
      "https://www.nhl.com/player/1",
    );
    store.add_record(input).await.unwrap();
  }
}

fn evaluator(store: Arc<SqliteStore>) -> Evaluator<SqliteStore> {
  Evaluator::new(store, Arc::new(config()))
}

// ─── Resolution ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn highest_tier_wins_and_lower_tiers_are_rejected() {
  let store = store_with(Position::Forward).await;
  for input in [
    record(GOALS, 2024, 42, SourceTier::Official, "https://www.nhl.com/a"),
    record(GOALS, 2024, 40, SourceTier::Aggregator, "https://stats.example/b"),
    record(GOALS, 2024, 42, SourceTier::Commentary, "https://blog.example/c"),
  ] {
    store.add_record(input).await.unwrap();
  }

  let facts = evaluator(store).facts(PLAYER).await.unwrap();
  assert_eq!(facts.len(), 1);
  let fact = &facts[0];
  assert_eq!(fact.value(), Some(&StatValue::Count(42)));
  assert_eq!(fact.winner().map(|w| w.source_tier), Some(SourceTier::Official));
  assert_eq!(fact.rejected.len(), 2);
  assert!(fact.rejected.iter().all(|r| r.reason == RejectReason::LowerTier));
}

#[tokio::test]
async fn duplicate_records_do_not_change_facts() {
  let store = store_with(Position::Forward).await;
  add_season(&store, 2024, 82, 41, 82).await;
  let before = evaluator(Arc::clone(&store)).facts(PLAYER).await.unwrap();

  add_season(&store, 2024, 82, 41, 82).await;
  assert_eq!(store.snapshot(PLAYER).await.unwrap().len(), 3);
  let after = evaluator(store).facts(PLAYER).await.unwrap();
  assert_eq!(before, after);
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn evaluates_a_three_season_forward() {
  let store = store_with(Position::Forward).await;
  add_season(&store, 2022, 80, 25, 55).await;
  add_season(&store, 2023, 82, 33, 70).await;
  add_season(&store, 2024, 82, 41, 82).await;

  let eval = evaluator(Arc::clone(&store));
  let output = eval.evaluate(PLAYER, Vec::new()).await.unwrap();

  assert_eq!(output.player_id, PLAYER);
  assert_eq!(output.position, Position::Forward);
  assert!(output.current_rating.get() >= 7, "got {}", output.current_rating);
  assert_eq!(output.trend, Trend::Rising);
  assert!(output.reasoning.iter().all(|r| !r.is_empty()));
  assert!(output.unresolved_discrepancies.is_empty());

  let goals = &output.season_tables[GOALS];
  assert_eq!(goals.columns[MOST_RECENT].season, Some(Season::new(2024)));
  assert_eq!(goals.columns[MOST_RECENT].cell.stat_value(), Some(&StatValue::Count(41)));
  assert_eq!(goals.career.stat_value(), Some(&StatValue::Count(99)));

  let history = eval.history(PLAYER).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0], output);
}

#[tokio::test]
async fn single_season_limits_future_confidence() {
  let store = store_with(Position::Forward).await;
  add_season(&store, 2024, 82, 41, 82).await;

  let output = evaluator(store).evaluate(PLAYER, Vec::new()).await.unwrap();
  assert_eq!(output.trend, Trend::Unknown);
  assert!(output.future_confidence <= output.current_confidence);
}

#[tokio::test]
async fn longer_history_raises_current_confidence() {
  let rookie = store_with(Position::Forward).await;
  add_full_season(&rookie, 2024).await;
  let veteran = store_with(Position::Forward).await;
  for season in [2022, 2023, 2024] {
    add_full_season(&veteran, season).await;
  }

  let one = evaluator(rookie).evaluate(PLAYER, Vec::new()).await.unwrap();
  let three = evaluator(veteran).evaluate(PLAYER, Vec::new()).await.unwrap();
  assert_eq!(one.current_rating, three.current_rating);
  assert!(
    one.current_confidence < three.current_confidence,
    "{} vs {}",
    one.current_confidence,
    three.current_confidence
  );
  assert!(one.future_confidence < three.future_confidence);
}

#[tokio::test]
async fn declining_player_is_not_projected_upward() {
  let store = store_with(Position::Forward).await;
  add_season(&store, 2022, 82, 41, 82).await;
  add_season(&store, 2023, 82, 33, 70).await;
  add_season(&store, 2024, 80, 25, 55).await;

  let output = evaluator(store).evaluate(PLAYER, Vec::new()).await.unwrap();
  assert_eq!(output.trend, Trend::Declining);
  assert!(output.future_rating <= output.current_rating);
  assert!(!output.reasoning[1].contains("growth credited"));
}

#[tokio::test]
async fn lower_tier_metrics_never_lower_confidence() {
  let store = store_with(Position::Forward).await;
  let rate = |stat: &str, season: u16, value: &str| {
    NewSourceRecord::new(
      PLAYER,
      stat,
      Season::new(season).into(),
      "NHL",
      value,
      SourceTier::Official,
      "https://www.nhl.com/player/1",
    )
  };
  for season in [2022, 2023, 2024] {
    for input in [
      rate(SHOOTING_PCT, season, "12.5"),
      rate(CORSI_FOR_PCT, season, "53.0"),
      rate(TOI_PER_GAME, season, "18:30"),
    ] {
      store.add_record(input).await.unwrap();
    }
  }
  let eval = evaluator(Arc::clone(&store));
  let before = eval.evaluate(PLAYER, Vec::new()).await.unwrap();

  // Corroborated commentary: two independent hosts agree.
  for url in ["https://blog-a.example/p", "https://blog-b.example/p"] {
    for (stat, value) in [(GAMES_PLAYED, 82), (POINTS, 65)] {
      store.add_record(record(stat, 2024, value, SourceTier::Commentary, url)).await.unwrap();
    }
  }
  let after = eval.evaluate(PLAYER, Vec::new()).await.unwrap();

  let rated = |o: &scout_core::report::EvaluationOutput| {
    o.dimensions.iter().filter(|d| d.stanine.is_some()).count()
  };
  assert_eq!(rated(&after), rated(&before) + 1);
  assert!(after.current_confidence >= before.current_confidence);
  assert!(after.future_confidence >= before.future_confidence);
}

#[tokio::test]
async fn excluded_commentary_does_not_displace_the_season() {
  let store = store_with(Position::Forward).await;
  let ahl = |stat: &str, value: i64, tier: SourceTier, url: &str| {
    NewSourceRecord::new(PLAYER, stat, Season::new(2024).into(), "AHL", value, tier, url)
  };
  for input in [
    ahl(GAMES_PLAYED, 70, SourceTier::Official, "https://theahl.com/p"),
    ahl(GOALS, 28, SourceTier::Official, "https://theahl.com/p"),
    ahl(POINTS, 55, SourceTier::Official, "https://theahl.com/p"),
    record(GOALS, 2024, 2, SourceTier::Commentary, "https://blog.example/callup"),
  ] {
    store.add_record(input).await.unwrap();
  }

  let output = evaluator(store).evaluate(PLAYER, Vec::new()).await.unwrap();
  let goals = &output.season_tables[GOALS].columns[MOST_RECENT];
  assert_eq!(goals.season, Some(Season::new(2024)));
  assert_eq!(goals.cell.stat_value(), Some(&StatValue::Count(28)));
  assert_eq!(goals.cell.league(), Some("AHL"));
  let gp = &output.season_tables[GAMES_PLAYED].columns[MOST_RECENT];
  assert_eq!(gp.cell.stat_value(), Some(&StatValue::Count(70)));
  assert!(
    output
      .unresolved_discrepancies
      .iter()
      .any(|d| d.statistic_id == GOALS && d.kind == DiscrepancyKind::Uncorroborated)
  );
}

#[tokio::test]
async fn player_without_records_is_not_rateable() {
  let store = store_with(Position::Forward).await;
  let err = evaluator(store).evaluate(PLAYER, Vec::new()).await.unwrap_err();
  assert!(matches!(err, Error::NoUsableRecords(ref id) if id == PLAYER));
}

#[tokio::test]
async fn unknown_player_is_reported() {
  let store = store_with(Position::Forward).await;
  let err = evaluator(store).evaluate("nobody", Vec::new()).await.unwrap_err();
  assert!(matches!(err, Error::PlayerNotFound(_)));
}

#[tokio::test]
async fn same_tier_conflict_stays_unresolved() {
  let store = store_with(Position::Forward).await;
  add_season(&store, 2024, 82, 41, 82).await;
  store
    .add_record(record(GOALS, 2024, 39, SourceTier::Official, "https://www.nhl.com/other"))
    .await
    .unwrap();

  let output = evaluator(store).evaluate(PLAYER, Vec::new()).await.unwrap();
  let goals = &output.season_tables[GOALS];
  assert!(matches!(goals.columns[MOST_RECENT].cell, Cell::Unresolved { ref candidates } if candidates.len() == 2));
  assert_eq!(output.unresolved_discrepancies.len(), 1);
  assert_eq!(output.unresolved_discrepancies[0].kind, DiscrepancyKind::SameTierConflict);
  assert!(
    output
      .diagnostics
      .iter()
      .any(|d| matches!(d, Diagnostic::UnresolvedConflict { statistic_id, .. } if statistic_id == GOALS))
  );
}

#[tokio::test]
async fn uncorroborated_commentary_is_a_discrepancy() {
  let store = store_with(Position::Forward).await;
  add_season(&store, 2024, 82, 41, 82).await;
  store
    .add_record(record("hits", 2024, 120, SourceTier::Commentary, "https://blog.example/x"))
    .await
    .unwrap();

  let output = evaluator(store).evaluate(PLAYER, Vec::new()).await.unwrap();
  let hits: Vec<_> =
    output.unresolved_discrepancies.iter().filter(|d| d.statistic_id == "hits").collect();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].kind, DiscrepancyKind::Uncorroborated);
}

#[tokio::test]
async fn old_data_is_flagged_stale() {
  let store = store_with(Position::Forward).await;
  add_season(&store, 2021, 82, 30, 60).await;

  let output = evaluator(store).evaluate(PLAYER, Vec::new()).await.unwrap();
  assert!(output.diagnostics.iter().any(|d| matches!(
    d,
    Diagnostic::StaleData { most_recent: Some(s), seasons_behind: 2 } if *s == Season::new(2021)
  )));
}

#[tokio::test]
async fn unparseable_record_is_diagnosed_not_fatal() {
  let store = store_with(Position::Goalie).await;
  store.add_record(official(GAMES_PLAYED, 2024, 50)).await.unwrap();
  store
    .add_record(NewSourceRecord::new(
      PLAYER,
      SAVE_PCT,
      Season::new(2024).into(),
      "NHL",
      "ninety",
      SourceTier::Official,
      "https://www.nhl.com/g",
    ))
    .await
    .unwrap();

  let output = evaluator(store).evaluate(PLAYER, Vec::new()).await.unwrap();
  assert!(output.diagnostics.iter().any(
    |d| matches!(d, Diagnostic::FormatError { statistic_id, .. } if statistic_id == SAVE_PCT)
  ));
}

#[tokio::test]
async fn role_signals_shift_the_current_rating() {
  let store = store_with(Position::Forward).await;
  add_season(&store, 2024, 82, 12, 40).await;

  let eval = evaluator(store);
  let plain = eval.evaluate(PLAYER, Vec::new()).await.unwrap();
  let signal = |note: &str| QualitativeSignal {
    kind:      SignalKind::Role,
    direction: Direction::Negative,
    note:      note.to_owned(),
  };
  let demoted =
    eval.evaluate(PLAYER, vec![signal("fourth line"), signal("healthy scratches")]).await.unwrap();
  assert!(demoted.current_rating < plain.current_rating);
  assert_eq!(eval.history(PLAYER).await.unwrap().len(), 2);
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

struct Fixed(Vec<NewSourceRecord>);

#[async_trait]
impl RecordProvider for Fixed {
  fn name(&self) -> &str { "fixed" }

  async fn fetch(&self, _player: &Player) -> Result<Vec<NewSourceRecord>, ProviderError> {
    Ok(self.0.clone())
  }
}

struct Slow;

#[async_trait]
impl RecordProvider for Slow {
  fn name(&self) -> &str { "slow" }

  async fn fetch(&self, _player: &Player) -> Result<Vec<NewSourceRecord>, ProviderError> {
    tokio::time::sleep(Duration::from_secs(30)).await;
    Ok(vec![official(GOALS, 2024, 1)])
  }
}

struct Broken;

#[async_trait]
impl RecordProvider for Broken {
  fn name(&self) -> &str { "broken" }

  async fn fetch(&self, _player: &Player) -> Result<Vec<NewSourceRecord>, ProviderError> {
    Err(ProviderError::Failed("connection refused".to_owned()))
  }
}

fn season_records(season: u16) -> Vec<NewSourceRecord> {
  vec![official(GAMES_PLAYED, season, 82), official(GOALS, season, 41), official(POINTS, season, 82)]
}

#[tokio::test]
async fn slow_and_failing_providers_do_not_block_the_rest() {
  let store = store_with(Position::Forward).await;
  let player = store.get_player(PLAYER).await.unwrap().unwrap();

  let mut records = season_records(2024);
  records.push(NewSourceRecord { player_id: "someone_else".to_owned(), ..official(GOALS, 2024, 3) });
  let providers: Vec<Arc<dyn RecordProvider>> =
    vec![Arc::new(Fixed(records)), Arc::new(Slow), Arc::new(Broken)];

  let report = ingest::ingest(&*store, &player, &providers, Duration::from_millis(50))
    .await
    .unwrap();

  assert_eq!(report.outcomes.len(), 3);
  assert_eq!(report.outcomes[0].status, ProviderStatus::Completed {
    fetched:    4,
    inserted:   3,
    duplicates: 0,
    foreign:    1,
  });
  assert_eq!(report.outcomes[1].status, ProviderStatus::TimedOut);
  assert!(matches!(report.outcomes[2].status, ProviderStatus::Failed { .. }));
  assert_eq!(report.inserted(), 3);
  assert_eq!(report.diagnostics().len(), 2);
  assert_eq!(store.snapshot(PLAYER).await.unwrap().len(), 3);
}

#[tokio::test]
async fn repeated_ingestion_is_idempotent() {
  let store = store_with(Position::Forward).await;
  let player = store.get_player(PLAYER).await.unwrap().unwrap();
  let providers: Vec<Arc<dyn RecordProvider>> = vec![Arc::new(Fixed(season_records(2024)))];

  let first = ingest::ingest(&*store, &player, &providers, Duration::from_secs(1)).await.unwrap();
  let second = ingest::ingest(&*store, &player, &providers, Duration::from_secs(1)).await.unwrap();

  assert_eq!(first.inserted(), 3);
  assert_eq!(second.inserted(), 0);
  assert!(matches!(second.outcomes[0].status, ProviderStatus::Completed { duplicates: 3, .. }));
  assert_eq!(store.snapshot(PLAYER).await.unwrap().len(), 3);
}

#[tokio::test]
async fn evaluator_reports_provider_failures_as_diagnostics() {
  let store = store_with(Position::Forward).await;
  let providers: Vec<Arc<dyn RecordProvider>> =
    vec![Arc::new(Fixed(season_records(2024))), Arc::new(Broken)];

  let output = Evaluator::new(store, Arc::new(config()))
    .with_providers(providers)
    .evaluate(PLAYER, Vec::new())
    .await
    .unwrap();

  assert_eq!(output.season_tables[GOALS].columns[MOST_RECENT].cell.stat_value(), Some(&StatValue::Count(41)));
  assert!(output.diagnostics.iter().any(
    |d| matches!(d, Diagnostic::SourceFailed { provider, .. } if provider == "broken")
  ));
  let facts = Evaluator::new(
    Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    Arc::new(config()),
  )
  .facts(PLAYER)
  .await;
  assert!(matches!(facts, Err(Error::PlayerNotFound(_))));
}

#[test]
fn resolution_status_serializes_with_tag() {
  let json = serde_json::to_value(Resolution::NoEligibleRecord).unwrap();
  assert_eq!(json["status"], "no_eligible_record");
}
