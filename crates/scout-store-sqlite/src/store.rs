//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use scout_core::{
  player::{NewPlayer, Player, Position},
  record::{NewSourceRecord, SourceRecord},
  report::EvaluationOutput,
  season::SeasonLabel,
  store::{AddOutcome, RecordStore},
};

use crate::{
  encode::{
    encode_date, encode_dt, encode_position, encode_raw_value, RawPlayer, RawRecord,
    PLAYER_COLUMNS, RECORD_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

/// What happened inside the insert transaction of `add_record`.
enum Insert {
  MissingPlayer,
  Inserted,
  Existing(RawRecord),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Scout record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select_records(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<SourceRecord>> {
    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Players ───────────────────────────────────────────────────────────────

  async fn add_player(&self, input: NewPlayer) -> Result<Player> {
    let player = Player::from_new(input, Utc::now());

    let id_str       = player.player_id.clone();
    let name         = player.name.clone();
    let team         = player.team.clone();
    let position_str = encode_position(player.position);
    let birth_str    = player.birth_date.map(encode_date);
    let at_str       = encode_dt(player.created_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO players (player_id, name, team, position, birth_date, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, team, position_str, birth_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::PlayerExists(player.player_id));
    }
    Ok(player)
  }

  async fn get_player(&self, player_id: &str) -> Result<Option<Player>> {
    let id_str = player_id.to_owned();

    let raw: Option<RawPlayer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = ?1"),
            rusqlite::params![id_str],
            RawPlayer::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPlayer::into_player).transpose()
  }

  async fn list_players(&self, position: Option<Position>) -> Result<Vec<Player>> {
    let position_str = position.map(encode_position);

    let raws: Vec<RawPlayer> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(p) = position_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE position = ?1 ORDER BY player_id"
          ))?;
          stmt
            .query_map(rusqlite::params![p], RawPlayer::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt =
            conn.prepare(&format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY player_id"))?;
          stmt
            .query_map([], RawPlayer::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlayer::into_player).collect()
  }

  // ── Records — append-only ─────────────────────────────────────────────────

  async fn add_record(&self, input: NewSourceRecord) -> Result<AddOutcome> {
    let record = SourceRecord::from_new(input, Utc::now())?;

    let record_id_str   = record.record_id.clone();
    let player_id_str   = record.player_id.clone();
    let statistic_id    = record.statistic_id.clone();
    let season_str      = record.season_label.to_string();
    let league          = record.league.clone();
    let value_json_str  = encode_raw_value(&record.value)?;
    let unit_str        = record.unit.map(|u| u.to_string());
    let tier            = i64::from(record.source_tier.number());
    let source_url      = record.source_url.clone();
    let observed_at_str = record.observed_at.map(encode_dt);
    let note            = record.note.clone();
    let recorded_at_str = encode_dt(record.recorded_at);

    let insert = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let player_exists = tx
          .query_row(
            "SELECT 1 FROM players WHERE player_id = ?1",
            rusqlite::params![player_id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !player_exists {
          return Ok(Insert::MissingPlayer);
        }

        let changed = tx.execute(
          "INSERT OR IGNORE INTO source_records (
             record_id, player_id, statistic_id, season_label, league,
             value_json, unit, source_tier, source_url, observed_at, note,
             recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            record_id_str,
            player_id_str,
            statistic_id,
            season_str,
            league,
            value_json_str,
            unit_str,
            tier,
            source_url,
            observed_at_str,
            note,
            recorded_at_str,
          ],
        )?;

        let outcome = if changed == 0 {
          let existing = tx.query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM source_records WHERE record_id = ?1"),
            rusqlite::params![record_id_str],
            RawRecord::from_row,
          )?;
          Insert::Existing(existing)
        } else {
          Insert::Inserted
        };
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    match insert {
      Insert::MissingPlayer => Err(Error::PlayerNotFound(record.player_id)),
      Insert::Inserted => Ok(AddOutcome::Inserted(record)),
      Insert::Existing(raw) => {
        debug!(record = %record.record_id, "duplicate record ignored");
        Ok(AddOutcome::Duplicate(raw.into_record()?))
      }
    }
  }

  async fn records_for(
    &self,
    player_id: &str,
    statistic_id: &str,
    season_label: SeasonLabel,
  ) -> Result<Vec<SourceRecord>> {
    self
      .select_records(
        format!(
          "SELECT {RECORD_COLUMNS} FROM source_records
           WHERE player_id = ?1 AND statistic_id = ?2 AND season_label = ?3
           ORDER BY rowid"
        ),
        vec![player_id.to_owned(), statistic_id.to_owned(), season_label.to_string()],
      )
      .await
  }

  async fn snapshot(&self, player_id: &str) -> Result<Vec<SourceRecord>> {
    self
      .select_records(
        format!("SELECT {RECORD_COLUMNS} FROM source_records WHERE player_id = ?1 ORDER BY rowid"),
        vec![player_id.to_owned()],
      )
      .await
  }

  // ── Evaluation history — append-only ──────────────────────────────────────

  async fn record_evaluation(&self, output: &EvaluationOutput) -> Result<()> {
    let id_str        = output.evaluation_id.to_string();
    let player_id_str = output.player_id.clone();
    let at_str        = encode_dt(output.generated_at);
    let json          = serde_json::to_string(output)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO evaluations (evaluation_id, player_id, generated_at, output_json)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, player_id_str, at_str, json],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn evaluations(&self, player_id: &str) -> Result<Vec<EvaluationOutput>> {
    let id_str = player_id.to_owned();

    let rows: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT output_json FROM evaluations WHERE player_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows.iter().map(|json| serde_json::from_str(json).map_err(Error::from)).collect()
  }
}
