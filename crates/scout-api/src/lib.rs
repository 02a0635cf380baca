//! JSON REST API for Scout.
//!
//! Exposes an axum [`Router`] backed by any [`scout_core::store::RecordStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", scout_api::api_router(store.clone(), config.clone()))
//! ```

pub mod error;
pub mod evaluations;
pub mod players;
pub mod records;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use scout_core::store::RecordStore;
use scout_engine::EngineConfig;

pub use error::ApiError;

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S: RecordStore> {
  pub store:  Arc<S>,
  pub config: Arc<EngineConfig>,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, config: Arc<EngineConfig>) -> Router<()>
where
  S: RecordStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Players
    .route("/players", get(players::list::<S>).post(players::create::<S>))
    .route("/players/{id}", get(players::get_one::<S>))
    // Records
    .route("/players/{id}/records", get(records::list::<S>).post(records::create::<S>))
    // Reconciliation and ratings
    .route("/players/{id}/facts", get(evaluations::facts::<S>))
    .route("/players/{id}/evaluate", post(evaluations::evaluate::<S>))
    .route("/players/{id}/evaluations", get(evaluations::history::<S>))
    .with_state(AppState { store, config })
}
