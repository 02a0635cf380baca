//! The structured evaluation output and its diagnostics.
//!
//! [`EvaluationOutput`] is the contract consumed by report assemblers. It is
//! versioned by [`SCHEMA_VERSION`]; additive changes keep the version.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  fact::{Candidate, RejectReason},
  normalize::UnitClass,
  player::Position,
  profile::ContractSummary,
  rating::{ConfidenceScore, DimensionScore, Rating, Trend},
  row::SeasonRow,
  season::{Season, SeasonLabel},
};

pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
  /// Records in the winning tier with the latest observation disagree.
  SameTierConflict,
  /// Only uncorroborated commentary reported the statistic.
  Uncorroborated,
}

/// A conflict the engine refused to resolve silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
  pub statistic_id: String,
  pub season_label: SeasonLabel,
  pub league:       String,
  pub kind:         DiscrepancyKind,
  pub candidates:   Vec<Candidate>,
}

/// A non-fatal condition observed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
  /// A record whose value could not be coerced into its unit.
  FormatError {
    record_id:    String,
    statistic_id: String,
    season_label: SeasonLabel,
    unit:         UnitClass,
    input:        String,
    reason:       String,
  },
  /// A record that lost resolution for its key.
  RecordRejected {
    record_id:    String,
    statistic_id: String,
    season_label: SeasonLabel,
    league:       String,
    reason:       RejectReason,
  },
  UnresolvedConflict {
    statistic_id: String,
    season_label: SeasonLabel,
    league:       String,
    candidates:   usize,
  },
  /// A rating dimension, or the whole rating, lacked data.
  InsufficientData { detail: String },
  /// The most recent season is older than the freshness threshold allows.
  StaleData {
    most_recent:    Option<Season>,
    seasons_behind: u16,
  },
  SourceTimeout { provider: String, timeout_secs: u64 },
  SourceFailed { provider: String, error: String },
}

/// One evaluation run for one player. Appended to history; never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutput {
  pub evaluation_id:            Uuid,
  pub schema_version:           String,
  pub engine_version:           String,
  pub generated_at:             DateTime<Utc>,
  pub player_id:                String,
  pub player_name:              String,
  pub position:                 Position,
  pub current_rating:           Rating,
  pub future_rating:            Rating,
  pub current_confidence:       ConfidenceScore,
  pub future_confidence:        ConfidenceScore,
  pub reasoning:                [String; 3],
  pub trend:                    Trend,
  pub dimensions:               Vec<DimensionScore>,
  pub contract:                 ContractSummary,
  pub season_tables:            BTreeMap<String, SeasonRow>,
  pub unresolved_discrepancies: Vec<Discrepancy>,
  pub diagnostics:              Vec<Diagnostic>,
}
