//! SQL schema for the Scout SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS players (
    player_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    team        TEXT,
    position    TEXT NOT NULL,   -- 'forward' | 'defense' | 'goalie'
    birth_date  TEXT,            -- YYYY-MM-DD
    created_at  TEXT NOT NULL
);

-- Source records are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table. The record id is
-- the SHA-256 of the record content, so re-inserting identical content is
-- ignored. Insertion order is the rowid.
CREATE TABLE IF NOT EXISTS source_records (
    record_id     TEXT PRIMARY KEY,
    player_id     TEXT NOT NULL REFERENCES players(player_id),
    statistic_id  TEXT NOT NULL,
    season_label  TEXT NOT NULL,   -- '2024-25' | 'career'
    league        TEXT NOT NULL,
    value_json    TEXT NOT NULL,   -- raw value as reported
    unit          TEXT,            -- explicit unit class or NULL
    source_tier   INTEGER NOT NULL CHECK (source_tier BETWEEN 1 AND 5),
    source_url    TEXT NOT NULL,
    observed_at   TEXT,            -- ISO 8601 UTC or NULL
    note          TEXT,
    recorded_at   TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- Evaluation history; append-only.
CREATE TABLE IF NOT EXISTS evaluations (
    evaluation_id TEXT PRIMARY KEY,
    player_id     TEXT NOT NULL REFERENCES players(player_id),
    generated_at  TEXT NOT NULL,
    output_json   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS records_player_idx ON source_records(player_id);
CREATE INDEX IF NOT EXISTS records_key_idx
    ON source_records(player_id, statistic_id, season_label);
CREATE INDEX IF NOT EXISTS evaluations_player_idx ON evaluations(player_id);

PRAGMA user_version = 1;
";
