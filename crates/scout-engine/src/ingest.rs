//! Concurrent record ingestion.
//!
//! Every provider runs concurrently, each bounded by a timeout. A provider
//! that fails or times out is logged and contributes no records; the others
//! are unaffected. Records are appended only after all providers have
//! finished, through the store's idempotent `add_record`.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::future::join_all;
use scout_core::{
  player::Player,
  record::NewSourceRecord,
  report::Diagnostic,
  store::{AddOutcome, RecordStore},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{Error, Result};

#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("{0}")]
  Failed(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed records: {0}")]
  Json(#[from] serde_json::Error),
}

/// A source of candidate records for a player.
#[async_trait]
pub trait RecordProvider: Send + Sync {
  /// Provider identifier used in logs and diagnostics.
  fn name(&self) -> &str;

  async fn fetch(&self, player: &Player) -> Result<Vec<NewSourceRecord>, ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderStatus {
  Completed {
    fetched:    usize,
    inserted:   usize,
    duplicates: usize,
    /// Records naming a different player.
    foreign:    usize,
  },
  TimedOut,
  Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderOutcome {
  pub provider: String,
  #[serde(flatten)]
  pub status:   ProviderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
  pub player_id:    String,
  pub timeout_secs: u64,
  pub outcomes:     Vec<ProviderOutcome>,
}

impl IngestReport {
  pub fn inserted(&self) -> usize {
    self
      .outcomes
      .iter()
      .map(|o| match o.status {
        ProviderStatus::Completed { inserted, .. } => inserted,
        _ => 0,
      })
      .sum()
  }

  /// Diagnostics for providers that timed out or failed.
  pub fn diagnostics(&self) -> Vec<Diagnostic> {
    self
      .outcomes
      .iter()
      .filter_map(|o| match &o.status {
        ProviderStatus::TimedOut => Some(Diagnostic::SourceTimeout {
          provider:     o.provider.clone(),
          timeout_secs: self.timeout_secs,
        }),
        ProviderStatus::Failed { error } => {
          Some(Diagnostic::SourceFailed { provider: o.provider.clone(), error: error.clone() })
        }
        ProviderStatus::Completed { .. } => None,
      })
      .collect()
  }
}

enum Fetched {
  Records(Vec<NewSourceRecord>),
  TimedOut,
  Failed(String),
}

/// Run every provider for `player` and append what they return.
pub async fn ingest<S: RecordStore>(
  store: &S,
  player: &Player,
  providers: &[Arc<dyn RecordProvider>],
  timeout: Duration,
) -> Result<IngestReport> {
  let fetches = providers.iter().map(|provider| {
    let provider = Arc::clone(provider);
    async move {
      let fetched = match tokio::time::timeout(timeout, provider.fetch(player)).await {
        Ok(Ok(records)) => {
          debug!(provider = provider.name(), count = records.len(), "provider returned records");
          Fetched::Records(records)
        }
        Ok(Err(e)) => {
          warn!(provider = provider.name(), player = %player.player_id, error = %e, "provider failed");
          Fetched::Failed(e.to_string())
        }
        Err(_) => {
          warn!(
            provider = provider.name(),
            player = %player.player_id,
            timeout_secs = timeout.as_secs(),
            "provider timed out; treating as no records"
          );
          Fetched::TimedOut
        }
      };
      (provider.name().to_owned(), fetched)
    }
  });

  // All providers have quiesced before anything is written.
  let results = join_all(fetches).await;

  let mut outcomes = Vec::with_capacity(results.len());
  for (provider, fetched) in results {
    let status = match fetched {
      Fetched::TimedOut => ProviderStatus::TimedOut,
      Fetched::Failed(error) => ProviderStatus::Failed { error },
      Fetched::Records(records) => {
        let fetched = records.len();
        let (mut inserted, mut duplicates, mut foreign) = (0, 0, 0);
        for record in records {
          if record.player_id != player.player_id {
            warn!(provider = %provider, record_player = %record.player_id, "skipping record for another player");
            foreign += 1;
            continue;
          }
          match store.add_record(record).await.map_err(|e| Error::Store(Box::new(e)))? {
            AddOutcome::Inserted(_) => inserted += 1,
            AddOutcome::Duplicate(_) => duplicates += 1,
          }
        }
        ProviderStatus::Completed { fetched, inserted, duplicates, foreign }
      }
    };
    outcomes.push(ProviderOutcome { provider, status });
  }

  let report = IngestReport {
    player_id: player.player_id.clone(),
    timeout_secs: timeout.as_secs(),
    outcomes,
  };
  info!(
    player = %report.player_id,
    providers = providers.len(),
    inserted = report.inserted(),
    "ingestion complete"
  );
  Ok(report)
}
