//! Weekly status intake for both reporting organisations, plus the views built
//! on top of it: per-tower history, TWG/TCS variance, the programme dashboard,
//! admin weight changes with recomputation, and CSV export.

mod dashboard;
pub mod domain;
mod export;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use dashboard::{PortfolioDashboard, RagCount, TowerHealthEntry};
pub use domain::{
    Org, ScoreHistoryEntry, SubmissionKey, SubmissionRecord, SubmissionRequest,
    SubmissionValidationError, SubmissionView, TowerId, VarianceReport,
};
pub use repository::{RepositoryError, SubmissionRepository, UpsertOutcome};
pub use router::tracking_router;
pub use service::{
    ActiveWeights, RecomputeSummary, SubmissionOutcome, TrackingService, TrackingServiceError,
};
