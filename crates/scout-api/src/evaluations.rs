//! Handlers for reconciliation and rating.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/players/:id/facts` | Canonical facts over every league |
//! | `POST` | `/players/:id/evaluate` | Body: `{"signals":[...]}` (optional); 422 when nothing is rateable |
//! | `GET`  | `/players/:id/evaluations` | Append-only history, oldest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use scout_core::{
  fact::CanonicalFact,
  profile::QualitativeSignal,
  report::EvaluationOutput,
  store::RecordStore,
};
use scout_engine::Evaluator;
use serde::Deserialize;

use crate::{AppState, error::ApiError};

fn evaluator<S: RecordStore>(state: &AppState<S>) -> Evaluator<S> {
  Evaluator::new(Arc::clone(&state.store), Arc::clone(&state.config))
}

/// `GET /players/:id/facts`
pub async fn facts<S: RecordStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<CanonicalFact>>, ApiError> {
  Ok(Json(evaluator(&state).facts(&id).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct EvaluateBody {
  #[serde(default)]
  pub signals: Vec<QualitativeSignal>,
}

/// `POST /players/:id/evaluate` — runs an evaluation and appends it to the
/// player's history.
pub async fn evaluate<S: RecordStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  body: Option<Json<EvaluateBody>>,
) -> Result<Json<EvaluationOutput>, ApiError> {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  Ok(Json(evaluator(&state).evaluate(&id, body.signals).await?))
}

/// `GET /players/:id/evaluations`
pub async fn history<S: RecordStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<EvaluationOutput>>, ApiError> {
  Ok(Json(evaluator(&state).history(&id).await?))
}
