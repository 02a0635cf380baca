//! A record provider backed by a JSON file of source records.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use scout_core::{player::Player, record::NewSourceRecord};
use scout_engine::ingest::{ProviderError, RecordProvider};

/// Reads a JSON array of records. Each run re-reads the file.
pub struct JsonFileProvider {
  name: String,
  path: PathBuf,
}

impl JsonFileProvider {
  pub fn new(path: impl AsRef<Path>) -> Self {
    let path = path.as_ref().to_path_buf();
    Self { name: path.display().to_string(), path }
  }
}

#[async_trait]
impl RecordProvider for JsonFileProvider {
  fn name(&self) -> &str { &self.name }

  async fn fetch(&self, player: &Player) -> Result<Vec<NewSourceRecord>, ProviderError> {
    let raw = tokio::fs::read_to_string(&self.path).await?;
    let records: Vec<NewSourceRecord> = serde_json::from_str(&raw)?;
    tracing::debug!(
      provider = %self.name,
      player = %player.player_id,
      count = records.len(),
      "read record file"
    );
    Ok(records)
  }
}
