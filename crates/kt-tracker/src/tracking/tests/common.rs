use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::scoring::{ScoreInput, ScoringWeights, WeekEnding};
use crate::tracking::domain::{
    Org, SubmissionKey, SubmissionRecord, SubmissionRequest, TowerId,
};
use crate::tracking::repository::{RepositoryError, SubmissionRepository, UpsertOutcome};
use crate::tracking::{tracking_router, TrackingService};

pub(super) const MONDAY: &str = "2026-02-16";
pub(super) const FRIDAY: &str = "2026-02-20";

pub(super) fn week() -> WeekEnding {
    FRIDAY.parse().expect("valid week ending")
}

pub(super) fn scores(value: f64) -> ScoreInput {
    ScoreInput {
        progress_score: value,
        coverage_score: value,
        confidence_score: value,
        operational_score: value,
        quality_score: value,
        has_active_blocker: false,
    }
}

pub(super) fn request(tower: &str, org: Org, week_ending: &str, value: f64) -> SubmissionRequest {
    SubmissionRequest {
        tower_id: TowerId(tower.to_string()),
        org,
        week_ending: week_ending.to_string(),
        scores: scores(value),
        narrative: None,
    }
}

pub(super) fn build_service() -> (TrackingService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = TrackingService::new(repository.clone(), ScoringWeights::default());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<BTreeMap<SubmissionKey, SubmissionRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl SubmissionRepository for MemoryRepository {
    fn upsert(&self, record: SubmissionRecord) -> Result<UpsertOutcome, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.insert(record.key.clone(), record) {
            Some(_) => Ok(UpsertOutcome::Updated),
            None => Ok(UpsertOutcome::Created),
        }
    }

    fn fetch(&self, key: &SubmissionKey) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(key).cloned())
    }

    fn for_tower(&self, tower_id: &TowerId) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.key.tower_id == tower_id)
            .cloned()
            .collect())
    }

    fn for_week(&self, week_ending: WeekEnding) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.key.week_ending == week_ending)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn replace_all(&self, records: Vec<SubmissionRecord>) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        *guard = records
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl SubmissionRepository for UnavailableRepository {
    fn upsert(&self, _record: SubmissionRecord) -> Result<UpsertOutcome, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _key: &SubmissionKey) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_tower(&self, _tower_id: &TowerId) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_week(&self, _week_ending: WeekEnding) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace_all(&self, _records: Vec<SubmissionRecord>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(service: TrackingService<MemoryRepository>) -> axum::Router {
    tracking_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
