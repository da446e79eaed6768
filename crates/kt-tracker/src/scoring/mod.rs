//! Knowledge-transfer health scoring.
//!
//! Five weighted sub-scores collapse into a 0–100 total, the total (plus an
//! active-blocker override) maps to a RAG status, and the totals reported by the
//! two organisations for the same week are compared for variance. Everything in
//! here is pure: no clock, no I/O, no shared state. Callers that omit weights get
//! [`ScoringWeights::default`] for that call only.

mod engine;
pub mod variance;
mod week;
mod weights;

pub use engine::{
    classify, compute_total_score, RagStatus, ScoreComponent, ScoreDimension, ScoreInput,
    ScoreResult, ScoringEngine,
};
pub use week::{
    normalise_week_ending, normalise_week_ending_str, UtcDate, WeekEnding, WeekEndingError,
};
pub use weights::{ScoringWeights, WeightsError, DEFAULT_VARIANCE_THRESHOLD, WEIGHT_SUM_TOLERANCE};

/// Total score and RAG status for one submission.
pub fn calculate_score(input: &ScoreInput, weights: Option<&ScoringWeights>) -> ScoreResult {
    let weights = weights.copied().unwrap_or_default();
    ScoringEngine::new(weights).score(input)
}

/// Reclassifies an already computed total without touching the raw sub-scores.
pub fn determine_rag<T: Into<f64>>(
    total_score: T,
    has_active_blocker: bool,
    weights: Option<&ScoringWeights>,
) -> RagStatus {
    let weights = weights.copied().unwrap_or_default();
    classify(total_score.into(), has_active_blocker, &weights)
}

pub fn calculate_variance(total_a: f64, total_b: f64) -> f64 {
    variance::calculate(total_a, total_b)
}

pub fn is_variance_flagged(variance: f64, threshold: Option<f64>) -> bool {
    variance::is_flagged(variance, threshold.unwrap_or(DEFAULT_VARIANCE_THRESHOLD))
}
