use std::io::Write;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{info, warn};

use super::dashboard::{build_dashboard, PortfolioDashboard};
use super::domain::{
    Org, ScoreHistoryEntry, SubmissionKey, SubmissionRecord, SubmissionRequest,
    SubmissionValidationError, TowerId, VarianceReport,
};
use super::export;
use super::repository::{RepositoryError, SubmissionRepository, UpsertOutcome};
use crate::scoring::{
    variance, ScoringEngine, ScoringWeights, WeekEnding, WeekEndingError, WeightsError,
};

/// Weight set currently applied to new submissions, with a version stamped onto
/// every record it scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveWeights {
    pub version: u32,
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    #[serde(skip)]
    pub upsert: UpsertOutcome,
    pub record: SubmissionRecord,
    pub variance: VarianceReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecomputeSummary {
    pub version: u32,
    pub records: usize,
    pub status_changes: usize,
}

/// Service composing the scoring engine with submission storage.
pub struct TrackingService<R> {
    repository: Arc<R>,
    active: RwLock<ActiveWeights>,
}

impl<R> TrackingService<R>
where
    R: SubmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>, weights: ScoringWeights) -> Self {
        Self {
            repository,
            active: RwLock::new(ActiveWeights {
                version: 1,
                weights,
            }),
        }
    }

    fn read_active(&self) -> RwLockReadGuard<'_, ActiveWeights> {
        self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_active(&self) -> RwLockWriteGuard<'_, ActiveWeights> {
        self.active.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn weights(&self) -> ActiveWeights {
        *self.read_active()
    }

    pub fn engine(&self) -> ScoringEngine {
        ScoringEngine::new(self.read_active().weights)
    }

    /// Score a weekly submission and upsert it under its (tower, week, org) key.
    pub fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionOutcome, TrackingServiceError> {
        request.validate()?;
        let week_ending: WeekEnding = request.week_ending.parse()?;

        // Held across the upsert so a concurrent weight change cannot interleave.
        let active = self.read_active();
        let engine = ScoringEngine::new(active.weights);
        let result = engine.score(&request.scores);

        let key = SubmissionKey {
            tower_id: TowerId(request.tower_id.0.trim().to_string()),
            week_ending,
            org: request.org,
        };
        let record = SubmissionRecord {
            key,
            input: request.scores,
            result,
            narrative: request.narrative,
            weights_version: active.version,
        };

        let upsert = self.repository.upsert(record.clone())?;
        drop(active);

        info!(
            tower = %record.key.tower_id,
            week_ending = %record.key.week_ending,
            org = record.key.org.label(),
            total_score = record.result.total_score,
            rag_status = record.result.rag_status.label(),
            ?upsert,
            "submission scored"
        );

        let variance = self.variance_with(&engine, &record.key.tower_id, week_ending)?;
        if variance.flagged {
            warn!(
                tower = %variance.tower_id,
                week_ending = %variance.week_ending,
                variance = ?variance.variance,
                threshold = variance.threshold,
                "reporting variance between TWG and TCS exceeds threshold"
            );
        }

        Ok(SubmissionOutcome {
            upsert,
            record,
            variance,
        })
    }

    pub fn get(
        &self,
        key: &SubmissionKey,
    ) -> Result<Option<SubmissionRecord>, TrackingServiceError> {
        Ok(self.repository.fetch(key)?)
    }

    /// Compare both organisations for the tower's reporting week. The week is
    /// normalised, so any day of the week can be passed.
    pub fn variance_for(
        &self,
        tower_id: &TowerId,
        week_ending: WeekEnding,
    ) -> Result<VarianceReport, TrackingServiceError> {
        let engine = self.engine();
        self.variance_with(&engine, tower_id, week_ending)
    }

    fn variance_with(
        &self,
        engine: &ScoringEngine,
        tower_id: &TowerId,
        week_ending: WeekEnding,
    ) -> Result<VarianceReport, TrackingServiceError> {
        let lookup = |org: Org| {
            self.repository.fetch(&SubmissionKey {
                tower_id: tower_id.clone(),
                week_ending,
                org,
            })
        };
        let twg = lookup(Org::Twg)?.map(|record| record.result);
        let tcs = lookup(Org::Tcs)?.map(|record| record.result);

        let variance = variance::between(
            twg.map(|result| f64::from(result.total_score)),
            tcs.map(|result| f64::from(result.total_score)),
        );

        Ok(VarianceReport {
            tower_id: tower_id.clone(),
            week_ending,
            twg,
            tcs,
            variance,
            flagged: variance.map(|gap| engine.is_flagged(gap)).unwrap_or(false),
            threshold: engine.weights().variance_threshold,
        })
    }

    /// Trend for one tower, oldest week first.
    pub fn history(
        &self,
        tower_id: &TowerId,
    ) -> Result<Vec<ScoreHistoryEntry>, TrackingServiceError> {
        let mut entries: Vec<ScoreHistoryEntry> = self
            .repository
            .for_tower(tower_id)?
            .iter()
            .map(SubmissionRecord::history_entry)
            .collect();
        entries.sort_by(|a, b| {
            a.week_ending
                .cmp(&b.week_ending)
                .then_with(|| a.org.cmp(&b.org))
        });
        Ok(entries)
    }

    pub fn dashboard(
        &self,
        week_ending: WeekEnding,
    ) -> Result<PortfolioDashboard, TrackingServiceError> {
        let records = self.repository.for_week(week_ending)?;
        Ok(build_dashboard(week_ending, &records, &self.engine()))
    }

    /// Validate and activate a new weight set, then rescore every stored record
    /// from its original input.
    pub fn update_weights(
        &self,
        weights: ScoringWeights,
    ) -> Result<RecomputeSummary, TrackingServiceError> {
        weights.validate()?;

        let mut active = self.write_active();
        let version = active.version + 1;
        let engine = ScoringEngine::new(weights);

        let mut status_changes = 0usize;
        let records: Vec<SubmissionRecord> = self
            .repository
            .all()?
            .into_iter()
            .map(|mut record| {
                let result = engine.score(&record.input);
                if result.rag_status != record.result.rag_status {
                    status_changes += 1;
                }
                record.result = result;
                record.weights_version = version;
                record
            })
            .collect();
        let count = records.len();

        self.repository.replace_all(records)?;
        *active = ActiveWeights { version, weights };

        info!(
            version,
            records = count,
            status_changes,
            "scoring weights updated and history recomputed"
        );

        Ok(RecomputeSummary {
            version,
            records: count,
            status_changes,
        })
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, TrackingServiceError> {
        let records = self.repository.all()?;
        Ok(export::write_submissions(&records, writer)?)
    }
}

/// Error raised by the tracking service.
#[derive(Debug, thiserror::Error)]
pub enum TrackingServiceError {
    #[error(transparent)]
    Validation(#[from] SubmissionValidationError),
    #[error(transparent)]
    WeekEnding(#[from] WeekEndingError),
    #[error(transparent)]
    Weights(#[from] WeightsError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("failed to write CSV export: {0}")]
    Export(#[from] csv::Error),
}
