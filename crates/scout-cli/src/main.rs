//! `scout` — player reconciliation and rating from the command line.
//!
//! # Usage
//!
//! ```
//! scout roster import roster.csv
//! scout ingest --player edm_connor_mcdavid --file nhl.json --file capfriendly.json
//! scout evaluate edm_connor_mcdavid --signals signals.json
//! scout batch --position goalie
//! scout serve
//! ```

mod commands;
mod provider;
mod roster;
mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scout_core::player::Position;
use scout_engine::Evaluator;
use scout_store_sqlite::SqliteStore;
use settings::Settings;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "scout", author, version, about = "Hockey player reconciliation and ratings")]
struct Cli {
  /// Path to the TOML settings file.
  #[arg(short, long, env = "SCOUT_CONFIG", default_value = "scout.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Manage the player roster.
  Roster {
    #[command(subcommand)]
    command: RosterCommand,
  },
  /// Append source records for a player; each file is one provider.
  Ingest {
    #[arg(long)]
    player: String,
    #[arg(long = "file", required = true)]
    files:  Vec<PathBuf>,
  },
  /// Evaluate one player and write `<ratings_dir>/<id>.json`.
  Evaluate {
    player_id: String,
    /// JSON array of qualitative signals.
    #[arg(long)]
    signals:   Option<PathBuf>,
    /// Output file; defaults to `<ratings_dir>/<id>.json`.
    #[arg(long)]
    output:    Option<PathBuf>,
    /// Overwrite an existing output file.
    #[arg(long)]
    force:     bool,
  },
  /// Evaluate every registered player.
  Batch {
    #[arg(long)]
    position: Option<Position>,
    #[arg(long)]
    force:    bool,
  },
  /// Serve the JSON API.
  Serve,
}

#[derive(Subcommand)]
enum RosterCommand {
  /// Register players from a roster CSV.
  Import { csv: PathBuf },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  let store = Arc::new(store);

  match cli.command {
    Command::Roster { command: RosterCommand::Import { csv } } => {
      let summary = commands::import_roster(&store, &csv).await?;
      println!(
        "{} added, {} already registered, {} skipped",
        summary.added, summary.existing, summary.skipped
      );
    }

    Command::Ingest { player, files } => {
      let report = commands::ingest_files(&store, &settings.engine, &player, files.as_slice()).await?;
      println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Command::Evaluate { player_id, signals, output, force } => {
      let signals = match signals {
        Some(path) => commands::read_signals(&path)?,
        None => Vec::new(),
      };
      let output = output.unwrap_or_else(|| settings.rating_path(&player_id));
      let evaluator = Evaluator::new(Arc::clone(&store), Arc::new(settings.engine.clone()));
      match commands::evaluate_one(&evaluator, &player_id, signals, &output, force).await? {
        commands::Written::Evaluated => println!("wrote {}", output.display()),
        commands::Written::Skipped => {
          println!("{} exists; pass --force to overwrite", output.display())
        }
      }
    }

    Command::Batch { position, force } => {
      let summary = commands::batch(Arc::clone(&store), &settings, position, force).await?;
      println!(
        "{} evaluated, {} skipped, {} failed",
        summary.evaluated, summary.skipped, summary.failed
      );
    }

    Command::Serve => {
      let app = scout_api::api_router(store, Arc::new(settings.engine.clone()))
        .layer(TraceLayer::new_for_http());
      let address = format!("{}:{}", settings.host, settings.port);

      info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
      axum::serve(listener, app).await.context("server error")?;
    }
  }

  Ok(())
}
