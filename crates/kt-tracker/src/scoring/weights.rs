use serde::{Deserialize, Serialize};

/// Absolute tolerance used when checking that the five weight fractions sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Variance above which the two organisations' totals are considered in disagreement.
pub const DEFAULT_VARIANCE_THRESHOLD: f64 = 20.0;

/// Rubric configuration: the five weight fractions plus the classification and
/// variance thresholds. Passed explicitly to every scoring call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub progress_weight: f64,
    pub coverage_weight: f64,
    pub confidence_weight: f64,
    pub operational_weight: f64,
    pub quality_weight: f64,
    pub green_threshold: f64,
    pub amber_threshold: f64,
    pub variance_threshold: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            progress_weight: 0.25,
            coverage_weight: 0.25,
            confidence_weight: 0.20,
            operational_weight: 0.15,
            quality_weight: 0.15,
            green_threshold: 75.0,
            amber_threshold: 50.0,
            variance_threshold: DEFAULT_VARIANCE_THRESHOLD,
        }
    }
}

impl ScoringWeights {
    pub fn weight_sum(&self) -> f64 {
        self.progress_weight
            + self.coverage_weight
            + self.confidence_weight
            + self.operational_weight
            + self.quality_weight
    }

    /// Checks the configuration-level invariants. The scorer itself never calls
    /// this; it is applied where weights enter the system (environment, admin API).
    pub fn validate(&self) -> Result<(), WeightsError> {
        let named = [
            ("progress_weight", self.progress_weight),
            ("coverage_weight", self.coverage_weight),
            ("confidence_weight", self.confidence_weight),
            ("operational_weight", self.operational_weight),
            ("quality_weight", self.quality_weight),
            ("variance_threshold", self.variance_threshold),
        ];
        for (field, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::Negative { field, value });
            }
        }

        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::Sum { sum });
        }

        let thresholds_in_range = [self.green_threshold, self.amber_threshold]
            .iter()
            .all(|value| value.is_finite() && (0.0..=100.0).contains(value));
        if !thresholds_in_range || self.green_threshold <= self.amber_threshold {
            return Err(WeightsError::Thresholds {
                green: self.green_threshold,
                amber: self.amber_threshold,
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightsError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("weights must sum to 1.0 (got {sum:.4})")]
    Sum { sum: f64 },
    #[error("thresholds must satisfy 0 <= amber < green <= 100 (green {green}, amber {amber})")]
    Thresholds { green: f64, amber: f64 },
}
