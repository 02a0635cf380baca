//! Handlers for `/players/:id/records`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/players/:id/records` | Optional `statistic_id`, `season`; insertion order |
//! | `POST` | `/players/:id/records` | Body: [`RecordBody`]; 201 when inserted, 200 when an identical record exists |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use scout_core::{
  normalize::UnitClass,
  record::{NewSourceRecord, SourceRecord, SourceTier},
  season::SeasonLabel,
  store::{AddOutcome, RecordStore},
  value::RawValue,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError, players::require_player};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub statistic_id: Option<String>,
  /// `2024-25` or `career`.
  pub season:       Option<SeasonLabel>,
}

/// `GET /players/:id/records[?statistic_id=...][&season=...]`
pub async fn list<S: RecordStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SourceRecord>>, ApiError> {
  let player = require_player(&*state.store, &id).await?;

  let mut records = match (&params.statistic_id, params.season) {
    (Some(statistic_id), Some(season)) => state
      .store
      .records_for(&player.player_id, statistic_id, season)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?,
    _ => state
      .store
      .snapshot(&player.player_id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?,
  };

  if let Some(statistic_id) = &params.statistic_id {
    records.retain(|r| &r.statistic_id == statistic_id);
  }
  if let Some(season) = params.season {
    records.retain(|r| r.season_label == season);
  }
  Ok(Json(records))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /players/:id/records`. The player comes from
/// the path.
#[derive(Debug, Deserialize)]
pub struct RecordBody {
  pub statistic_id: String,
  pub season_label: SeasonLabel,
  pub league:       String,
  pub value:        RawValue,
  pub unit:         Option<UnitClass>,
  pub source_tier:  SourceTier,
  pub source_url:   String,
  pub observed_at:  Option<DateTime<Utc>>,
  pub note:         Option<String>,
}

impl RecordBody {
  fn into_new(self, player_id: String) -> NewSourceRecord {
    NewSourceRecord {
      player_id,
      statistic_id: self.statistic_id,
      season_label: self.season_label,
      league: self.league,
      value: self.value,
      unit: self.unit,
      source_tier: self.source_tier,
      source_url: self.source_url,
      observed_at: self.observed_at,
      note: self.note,
    }
  }
}

/// `POST /players/:id/records` — returns the stored record.
pub async fn create<S: RecordStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(body): Json<RecordBody>,
) -> Result<impl IntoResponse, ApiError> {
  for (field, value) in [
    ("statistic_id", &body.statistic_id),
    ("league", &body.league),
    ("source_url", &body.source_url),
  ] {
    if value.trim().is_empty() {
      return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
  }
  let player = require_player(&*state.store, &id).await?;

  let outcome = state
    .store
    .add_record(body.into_new(player.player_id))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(match outcome {
    AddOutcome::Inserted(record) => (StatusCode::CREATED, Json(record)),
    AddOutcome::Duplicate(record) => (StatusCode::OK, Json(record)),
  })
}
