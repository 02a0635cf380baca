//! Layered settings: an optional TOML file, then `SCOUT_*` environment
//! variables (`SCOUT_PORT`, `SCOUT_ENGINE__MIN_COVERAGE`, ...).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use scout_engine::EngineConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub store_path:  PathBuf,
  /// Where `evaluate` and `batch` write `<player_id>.json`.
  pub ratings_dir: PathBuf,
  pub host:        String,
  pub port:        u16,
  pub engine:      EngineConfig,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path:  PathBuf::from("scout.db"),
      ratings_dir: PathBuf::from("ratings"),
      host:        "127.0.0.1".to_owned(),
      port:        8080,
      engine:      EngineConfig::default(),
    }
  }
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(
        config::Environment::with_prefix("SCOUT")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .with_context(|| format!("failed to read settings from {}", path.display()))?;

    let mut settings: Settings =
      settings.try_deserialize().context("failed to deserialise settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    settings.ratings_dir = expand_tilde(&settings.ratings_dir);
    Ok(settings)
  }

  /// Output file for a player's evaluation.
  pub fn rating_path(&self, player_id: &str) -> PathBuf {
    self.ratings_dir.join(format!("{player_id}.json"))
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
