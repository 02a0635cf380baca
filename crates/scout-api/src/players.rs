//! Handlers for `/players` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/players` | Optional `?position=forward\|defense\|goalie` |
//! | `POST` | `/players` | Body: [`NewPlayer`]; 201, or 409 if the id is taken |
//! | `GET`  | `/players/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use scout_core::{
  player::{NewPlayer, Player, Position},
  store::RecordStore,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, error::ApiError};

/// Fetch a player or fail with 404.
pub(crate) async fn require_player<S: RecordStore>(
  store: &S,
  player_id: &str,
) -> Result<Player, ApiError> {
  store
    .get_player(player_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("player {player_id} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub position: Option<Position>,
}

/// `GET /players[?position=<position>]`
pub async fn list<S: RecordStore>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Player>>, ApiError> {
  let players = state
    .store
    .list_players(params.position)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(players))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /players` — body: a [`NewPlayer`].
pub async fn create<S: RecordStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewPlayer>,
) -> Result<impl IntoResponse, ApiError> {
  if body.player_id.trim().is_empty() {
    return Err(ApiError::BadRequest("player_id must not be empty".into()));
  }
  let existing = state
    .store
    .get_player(&body.player_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if existing.is_some() {
    return Err(ApiError::Conflict(format!("player {} already exists", body.player_id)));
  }

  let player = state
    .store
    .add_player(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  info!(player = %player.player_id, "player registered");
  Ok((StatusCode::CREATED, Json(player)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /players/:id`
pub async fn get_one<S: RecordStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Player>, ApiError> {
  Ok(Json(require_player(&*state.store, &id).await?))
}
