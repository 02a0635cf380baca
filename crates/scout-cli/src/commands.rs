//! Subcommand implementations, independent of argument parsing.

use std::{path::Path, sync::Arc};

use anyhow::Context as _;
use scout_core::{
  player::Position,
  profile::QualitativeSignal,
  report::EvaluationOutput,
  store::RecordStore,
};
use scout_engine::{
  EngineConfig, Evaluator,
  ingest::{self, IngestReport, RecordProvider},
};
use scout_store_sqlite::{Error as StoreError, SqliteStore};
use tracing::{info, warn};

use crate::{provider::JsonFileProvider, roster, settings::Settings};

// ─── Roster ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
  pub added:    usize,
  pub existing: usize,
  pub skipped:  usize,
}

pub async fn import_roster(store: &SqliteStore, path: &Path) -> anyhow::Result<ImportSummary> {
  let roster = roster::read_roster(path)?;
  let mut summary = ImportSummary { skipped: roster.skipped.len(), ..Default::default() };
  for player in roster.players {
    let id = player.player_id.clone();
    match store.add_player(player).await {
      Ok(_) => summary.added += 1,
      Err(StoreError::PlayerExists(_)) => summary.existing += 1,
      Err(e) => return Err(e).with_context(|| format!("failed to add player {id}")),
    }
  }
  info!(
    added = summary.added,
    existing = summary.existing,
    skipped = summary.skipped,
    "roster imported"
  );
  Ok(summary)
}

// ─── Ingest ───────────────────────────────────────────────────────────────────

pub async fn ingest_files(
  store: &SqliteStore,
  config: &EngineConfig,
  player_id: &str,
  files: &[impl AsRef<Path>],
) -> anyhow::Result<IngestReport> {
  let player = store
    .get_player(player_id)
    .await?
    .with_context(|| format!("unknown player {player_id}"))?;
  let providers: Vec<Arc<dyn RecordProvider>> = files
    .iter()
    .map(|f| Arc::new(JsonFileProvider::new(f)) as Arc<dyn RecordProvider>)
    .collect();
  Ok(ingest::ingest(store, &player, &providers, config.provider_timeout()).await?)
}

// ─── Evaluate ─────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub enum Written {
  Evaluated,
  /// The output file already existed and `--force` was not given.
  Skipped,
}

pub fn read_signals(path: &Path) -> anyhow::Result<Vec<QualitativeSignal>> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read signals {}", path.display()))?;
  serde_json::from_str(&raw).with_context(|| format!("failed to parse signals {}", path.display()))
}

fn write_output(output: &EvaluationOutput, path: &Path) -> anyhow::Result<()> {
  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create {}", dir.display()))?;
  }
  let json = serde_json::to_string_pretty(output)?;
  std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub async fn evaluate_one(
  evaluator: &Evaluator<SqliteStore>,
  player_id: &str,
  signals: Vec<QualitativeSignal>,
  output: &Path,
  force: bool,
) -> anyhow::Result<Written> {
  if output.exists() && !force {
    info!(player = player_id, path = %output.display(), "output exists; skipping");
    return Ok(Written::Skipped);
  }
  let result = evaluator
    .evaluate(player_id, signals)
    .await
    .with_context(|| format!("failed to evaluate {player_id}"))?;
  write_output(&result, output)?;
  info!(
    player = player_id,
    current = %result.current_rating,
    future = %result.future_rating,
    path = %output.display(),
    "wrote evaluation"
  );
  Ok(Written::Evaluated)
}

// ─── Batch ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
  pub evaluated: usize,
  pub skipped:   usize,
  pub failed:    usize,
}

pub async fn batch(
  store: Arc<SqliteStore>,
  settings: &Settings,
  position: Option<Position>,
  force: bool,
) -> anyhow::Result<BatchSummary> {
  let players = store.list_players(position).await?;
  let evaluator = Evaluator::new(Arc::clone(&store), Arc::new(settings.engine.clone()));
  let total = players.len();
  let mut summary = BatchSummary::default();

  for (idx, player) in players.iter().enumerate() {
    info!("[{}/{}] {}", idx + 1, total, player.player_id);
    let path = settings.rating_path(&player.player_id);
    match evaluate_one(&evaluator, &player.player_id, Vec::new(), &path, force).await {
      Ok(Written::Evaluated) => summary.evaluated += 1,
      Ok(Written::Skipped) => summary.skipped += 1,
      Err(e) => {
        warn!(player = %player.player_id, error = ?e, "evaluation failed");
        summary.failed += 1;
      }
    }
  }

  info!(
    total,
    evaluated = summary.evaluated,
    skipped = summary.skipped,
    failed = summary.failed,
    "batch complete"
  );
  Ok(summary)
}
