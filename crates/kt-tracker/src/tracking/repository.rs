use super::domain::{SubmissionKey, SubmissionRecord, TowerId};
use crate::scoring::WeekEnding;

/// Whether an upsert inserted a new (tower, week, org) row or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Storage abstraction so the tracking service can be exercised in isolation.
pub trait SubmissionRepository: Send + Sync {
    fn upsert(&self, record: SubmissionRecord) -> Result<UpsertOutcome, RepositoryError>;
    fn fetch(&self, key: &SubmissionKey) -> Result<Option<SubmissionRecord>, RepositoryError>;
    fn for_tower(&self, tower_id: &TowerId) -> Result<Vec<SubmissionRecord>, RepositoryError>;
    fn for_week(&self, week_ending: WeekEnding) -> Result<Vec<SubmissionRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<SubmissionRecord>, RepositoryError>;
    /// Swaps every stored record for the recomputed set in one step.
    fn replace_all(&self, records: Vec<SubmissionRecord>) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
