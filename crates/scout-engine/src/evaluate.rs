//! The evaluation pipeline: snapshot → normalize → resolve → tables →
//! ratings → output.

use std::sync::Arc;

use chrono::Utc;
use scout_core::{
  fact::{CanonicalFact, Resolution},
  normalize::normalize_record,
  player::Player,
  profile::{PlayerProfile, QualitativeSignal},
  record::SourceRecord,
  report::{Diagnostic, Discrepancy, DiscrepancyKind, EvaluationOutput, SCHEMA_VERSION},
  store::RecordStore,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  ENGINE_VERSION, Error, Result,
  config::EngineConfig,
  confidence,
  ingest::{self, RecordProvider},
  rating, resolve,
  table::SeasonTableBuilder,
};

/// Normalize and resolve a record snapshot. Records that fail normalization
/// are reported as diagnostics and take no part in resolution.
pub fn canonical_facts(records: &[SourceRecord]) -> (Vec<CanonicalFact>, Vec<Diagnostic>) {
  let mut normalized = Vec::with_capacity(records.len());
  let mut diagnostics = Vec::new();
  for record in records {
    match normalize_record(record) {
      Ok(n) => normalized.push(n),
      Err(e) => {
        warn!(record = %record.record_id, statistic = %record.statistic_id, error = %e, "rejected record");
        diagnostics.push(Diagnostic::FormatError {
          record_id:    record.record_id.clone(),
          statistic_id: record.statistic_id.clone(),
          season_label: record.season_label,
          unit:         e.unit,
          input:        e.input,
          reason:       e.reason,
        });
      }
    }
  }
  (resolve::resolve_all(&normalized), diagnostics)
}

/// Assemble the profile the rating engine reads.
pub fn build_profile(
  player: Player,
  facts: Vec<CanonicalFact>,
  signals: Vec<QualitativeSignal>,
  config: &EngineConfig,
) -> PlayerProfile {
  let builder = SeasonTableBuilder::new(&facts, config);
  let season_rows = builder.build_all();
  let contract = builder.contract_summary();
  let seasons = builder.seasons().to_vec();
  PlayerProfile { player, contract, facts, season_rows, seasons, signals }
}

/// Conflicts the engine declined to resolve.
pub fn discrepancies(facts: &[CanonicalFact]) -> Vec<Discrepancy> {
  facts
    .iter()
    .filter_map(|fact| {
      let (kind, candidates) = match &fact.resolution {
        Resolution::Unresolved { candidates } => {
          (DiscrepancyKind::SameTierConflict, candidates.clone())
        }
        Resolution::NoEligibleRecord => (
          DiscrepancyKind::Uncorroborated,
          fact.rejected.iter().map(|r| r.candidate.clone()).collect(),
        ),
        Resolution::Resolved { .. } => return None,
      };
      Some(Discrepancy {
        statistic_id: fact.key.statistic_id.clone(),
        season_label: fact.key.season,
        league: fact.key.league.clone(),
        kind,
        candidates,
      })
    })
    .collect()
}

fn resolution_diagnostics(facts: &[CanonicalFact]) -> Vec<Diagnostic> {
  let mut out = Vec::new();
  for fact in facts {
    if let Resolution::Unresolved { candidates } = &fact.resolution {
      out.push(Diagnostic::UnresolvedConflict {
        statistic_id: fact.key.statistic_id.clone(),
        season_label: fact.key.season,
        league:       fact.key.league.clone(),
        candidates:   candidates.len(),
      });
    }
    out.extend(fact.rejected.iter().map(|r| Diagnostic::RecordRejected {
      record_id:    r.candidate.record_id.clone(),
      statistic_id: fact.key.statistic_id.clone(),
      season_label: fact.key.season,
      league:       fact.key.league.clone(),
      reason:       r.reason,
    }));
  }
  out
}

/// Evaluate one player against a record snapshot. Pure: nothing is read
/// from or written to a store.
///
/// Fails with [`Error::NoUsableRecords`] when the snapshot is empty, no
/// record normalizes, or no fact resolves.
pub fn evaluate_snapshot(
  player: Player,
  records: &[SourceRecord],
  signals: Vec<QualitativeSignal>,
  config: &EngineConfig,
  mut diagnostics: Vec<Diagnostic>,
) -> Result<EvaluationOutput> {
  let (facts, format_errors) = canonical_facts(records);
  diagnostics.extend(format_errors);
  if !facts.iter().any(CanonicalFact::is_resolved) {
    return Err(Error::NoUsableRecords(player.player_id));
  }

  diagnostics.extend(resolution_diagnostics(&facts));
  let unresolved_discrepancies = discrepancies(&facts);
  let profile = build_profile(player, facts, signals, config);
  let result = rating::rate(&profile, config);

  let rated = result.dimensions.iter().filter(|d| d.stanine.is_some()).count();
  if rated == 0 {
    diagnostics.push(Diagnostic::InsufficientData {
      detail: format!(
        "no rateable {} metrics; rating set to the population median",
        profile.player.position
      ),
    });
  }
  diagnostics.extend(result.dimensions.iter().filter(|d| d.stanine.is_none()).map(|d| {
    Diagnostic::InsufficientData { detail: format!("{} unavailable for the most recent season", d.metric) }
  }));
  let inputs = confidence::inputs_for(&profile, config);
  if inputs.stale_seasons > 0 {
    diagnostics.push(Diagnostic::StaleData {
      most_recent:    profile.most_recent_season(),
      seasons_behind: inputs.stale_seasons,
    });
  }

  info!(
    player = %profile.player.player_id,
    current = %result.current_rating,
    future = %result.future_rating,
    current_confidence = %result.current_confidence,
    future_confidence = %result.future_confidence,
    "evaluated"
  );

  Ok(EvaluationOutput {
    evaluation_id: Uuid::new_v4(),
    schema_version: SCHEMA_VERSION.to_owned(),
    engine_version: ENGINE_VERSION.to_owned(),
    generated_at: Utc::now(),
    player_id: profile.player.player_id,
    player_name: profile.player.name,
    position: result.position,
    current_rating: result.current_rating,
    future_rating: result.future_rating,
    current_confidence: result.current_confidence,
    future_confidence: result.future_confidence,
    reasoning: result.rationale,
    trend: result.trend,
    dimensions: result.dimensions,
    contract: profile.contract,
    season_tables: profile.season_rows,
    unresolved_discrepancies,
    diagnostics,
  })
}

// ─── Evaluator ───────────────────────────────────────────────────────────────

/// Runs evaluations against a store: optional ingestion, one snapshot, the
/// pure pipeline, then an append to the player's history.
pub struct Evaluator<S> {
  store:     Arc<S>,
  config:    Arc<EngineConfig>,
  providers: Vec<Arc<dyn RecordProvider>>,
}

impl<S: RecordStore> Evaluator<S> {
  pub fn new(store: Arc<S>, config: Arc<EngineConfig>) -> Self {
    Self { store, config, providers: Vec::new() }
  }

  pub fn with_providers(mut self, providers: Vec<Arc<dyn RecordProvider>>) -> Self {
    self.providers = providers;
    self
  }

  fn store_err(e: S::Error) -> Error { Error::Store(Box::new(e)) }

  async fn player(&self, player_id: &str) -> Result<Player> {
    self
      .store
      .get_player(player_id)
      .await
      .map_err(Self::store_err)?
      .ok_or_else(|| Error::PlayerNotFound(player_id.to_owned()))
  }

  /// Canonical facts for a player's current records.
  pub async fn facts(&self, player_id: &str) -> Result<Vec<CanonicalFact>> {
    let player = self.player(player_id).await?;
    let records = self.store.snapshot(&player.player_id).await.map_err(Self::store_err)?;
    Ok(canonical_facts(&records).0)
  }

  /// Evaluate a player and append the output to their history.
  pub async fn evaluate(
    &self,
    player_id: &str,
    signals: Vec<QualitativeSignal>,
  ) -> Result<EvaluationOutput> {
    let player = self.player(player_id).await?;

    let mut diagnostics = Vec::new();
    if !self.providers.is_empty() {
      let report =
        ingest::ingest(&*self.store, &player, &self.providers, self.config.provider_timeout())
          .await?;
      diagnostics.extend(report.diagnostics());
    }

    let records = self.store.snapshot(&player.player_id).await.map_err(Self::store_err)?;
    let output = evaluate_snapshot(player, &records, signals, &self.config, diagnostics)?;
    self.store.record_evaluation(&output).await.map_err(Self::store_err)?;
    Ok(output)
  }

  /// Past evaluations, oldest first.
  pub async fn history(&self, player_id: &str) -> Result<Vec<EvaluationOutput>> {
    let player = self.player(player_id).await?;
    self.store.evaluations(&player.player_id).await.map_err(Self::store_err)
  }
}
