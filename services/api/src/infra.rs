use kt_tracker::scoring::{normalise_week_ending_str, WeekEnding};
use kt_tracker::tracking::{
    RepositoryError, SubmissionKey, SubmissionRecord, SubmissionRepository, TowerId,
    UpsertOutcome,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local submission store keyed by (tower, week, org).
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionRepository {
    records: Arc<Mutex<BTreeMap<SubmissionKey, SubmissionRecord>>>,
}

impl InMemorySubmissionRepository {
    fn guard(&self) -> MutexGuard<'_, BTreeMap<SubmissionKey, SubmissionRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn upsert(&self, record: SubmissionRecord) -> Result<UpsertOutcome, RepositoryError> {
        let previous = self.guard().insert(record.key.clone(), record);
        Ok(match previous {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Created,
        })
    }

    fn fetch(&self, key: &SubmissionKey) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Ok(self.guard().get(key).cloned())
    }

    fn for_tower(&self, tower_id: &TowerId) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Ok(self
            .guard()
            .values()
            .filter(|record| &record.key.tower_id == tower_id)
            .cloned()
            .collect())
    }

    fn for_week(&self, week_ending: WeekEnding) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Ok(self
            .guard()
            .values()
            .filter(|record| record.key.week_ending == week_ending)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Ok(self.guard().values().cloned().collect())
    }

    fn replace_all(&self, records: Vec<SubmissionRecord>) -> Result<(), RepositoryError> {
        *self.guard() = records
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
        Ok(())
    }
}

/// Clap value parser: any day of the reporting week, normalised to its Friday.
pub(crate) fn parse_week_ending(raw: &str) -> Result<WeekEnding, String> {
    normalise_week_ending_str(raw).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kt_tracker::scoring::{RagStatus, ScoreInput, ScoreResult};
    use kt_tracker::tracking::Org;

    fn record(org: Org, total_score: u8) -> SubmissionRecord {
        SubmissionRecord {
            key: SubmissionKey {
                tower_id: TowerId("payments".to_string()),
                week_ending: parse_week_ending("2026-02-18").expect("valid week"),
                org,
            },
            input: ScoreInput::default(),
            result: ScoreResult {
                total_score,
                rag_status: RagStatus::Amber,
            },
            narrative: None,
            weights_version: 1,
        }
    }

    #[test]
    fn upsert_reports_created_then_updated() {
        let repository = InMemorySubmissionRepository::default();

        assert_eq!(
            repository.upsert(record(Org::Twg, 60)).expect("insert"),
            UpsertOutcome::Created
        );
        assert_eq!(
            repository.upsert(record(Org::Twg, 65)).expect("update"),
            UpsertOutcome::Updated
        );
        repository.upsert(record(Org::Tcs, 55)).expect("insert");

        let stored = repository.all().expect("all");
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].result.total_score, 65);
    }

    #[test]
    fn parse_week_ending_normalises_and_reports_errors() {
        let week = parse_week_ending("2026-02-22").expect("sunday parses");
        assert_eq!(week.to_string(), "2026-02-20");
        assert!(parse_week_ending("22/02/2026").is_err());
    }
}
