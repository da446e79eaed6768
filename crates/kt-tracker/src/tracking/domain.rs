use crate::scoring::{RagStatus, ScoreDimension, ScoreInput, ScoreResult, WeekEnding};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for an organisational unit undergoing knowledge transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TowerId(pub String);

impl fmt::Display for TowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two organisations reporting on every tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Org {
    /// Transitioning work group.
    Twg,
    /// Transition services vendor.
    Tcs,
}

impl Org {
    pub const fn ordered() -> [Self; 2] {
        [Self::Twg, Self::Tcs]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Twg => "TWG",
            Self::Tcs => "TCS",
        }
    }

    pub const fn counterpart(self) -> Self {
        match self {
            Self::Twg => Self::Tcs,
            Self::Tcs => Self::Twg,
        }
    }
}

/// Weekly status as received from a caller. The week ending may be any day of
/// the reporting week; it is normalised before storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub tower_id: TowerId,
    pub org: Org,
    pub week_ending: String,
    #[serde(flatten)]
    pub scores: ScoreInput,
    #[serde(default)]
    pub narrative: Option<String>,
}

/// One submission per (tower, week, organisation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionKey {
    pub tower_id: TowerId,
    pub week_ending: WeekEnding,
    pub org: Org,
}

impl SubmissionKey {
    pub fn counterpart(&self) -> Self {
        Self {
            tower_id: self.tower_id.clone(),
            week_ending: self.week_ending,
            org: self.org.counterpart(),
        }
    }
}

/// Stored submission: the raw input kept next to the result it produced so the
/// result can be recomputed when weights change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub key: SubmissionKey,
    pub input: ScoreInput,
    pub result: ScoreResult,
    pub narrative: Option<String>,
    pub weights_version: u32,
}

impl SubmissionRecord {
    pub fn view(&self) -> SubmissionView {
        SubmissionView {
            tower_id: self.key.tower_id.clone(),
            week_ending: self.key.week_ending,
            org: self.key.org,
            total_score: self.result.total_score,
            rag_status: self.result.rag_status,
            has_active_blocker: self.input.has_active_blocker,
            weights_version: self.weights_version,
            narrative: self.narrative.clone(),
        }
    }

    pub fn history_entry(&self) -> ScoreHistoryEntry {
        ScoreHistoryEntry {
            week_ending: self.key.week_ending,
            org: self.key.org,
            total_score: self.result.total_score,
            rag_status: self.result.rag_status,
        }
    }
}

/// Flattened representation returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionView {
    pub tower_id: TowerId,
    pub week_ending: WeekEnding,
    pub org: Org,
    pub total_score: u8,
    pub rag_status: RagStatus,
    pub has_active_blocker: bool,
    pub weights_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreHistoryEntry {
    pub week_ending: WeekEnding,
    pub org: Org,
    pub total_score: u8,
    pub rag_status: RagStatus,
}

/// Comparison of both organisations' totals for one tower and week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarianceReport {
    pub tower_id: TowerId,
    pub week_ending: WeekEnding,
    pub twg: Option<ScoreResult>,
    pub tcs: Option<ScoreResult>,
    /// `None` until both organisations have reported.
    pub variance: Option<f64>,
    pub flagged: bool,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionValidationError {
    #[error("tower_id must not be empty")]
    EmptyTower,
    #[error("{} score must be between 0 and 100 (got {value})", .dimension.label())]
    ScoreOutOfRange {
        dimension: ScoreDimension,
        value: f64,
    },
}

impl SubmissionRequest {
    /// Caller-side range checks. The scorer tolerates anything; intake does not.
    pub fn validate(&self) -> Result<(), SubmissionValidationError> {
        if self.tower_id.0.trim().is_empty() {
            return Err(SubmissionValidationError::EmptyTower);
        }

        for dimension in ScoreDimension::ordered() {
            let value = self.scores.value(dimension);
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(SubmissionValidationError::ScoreOutOfRange { dimension, value });
            }
        }

        Ok(())
    }
}
