use super::variance;
use super::weights::ScoringWeights;
use serde::{Deserialize, Serialize};

/// The five independent readiness dimensions an organisation reports on each week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDimension {
    Progress,
    Coverage,
    Confidence,
    Operational,
    Quality,
}

impl ScoreDimension {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Progress,
            Self::Coverage,
            Self::Confidence,
            Self::Operational,
            Self::Quality,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Progress => "Progress",
            Self::Coverage => "Coverage",
            Self::Confidence => "Confidence",
            Self::Operational => "Operational",
            Self::Quality => "Quality",
        }
    }
}

/// One organisation's raw weekly assessment. Sub-scores are expected in 0..=100
/// but the scorer only clamps the final total.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreInput {
    pub progress_score: f64,
    pub coverage_score: f64,
    pub confidence_score: f64,
    pub operational_score: f64,
    pub quality_score: f64,
    #[serde(default)]
    pub has_active_blocker: bool,
}

impl ScoreInput {
    pub fn value(&self, dimension: ScoreDimension) -> f64 {
        match dimension {
            ScoreDimension::Progress => self.progress_score,
            ScoreDimension::Coverage => self.coverage_score,
            ScoreDimension::Confidence => self.confidence_score,
            ScoreDimension::Operational => self.operational_score,
            ScoreDimension::Quality => self.quality_score,
        }
    }
}

impl ScoringWeights {
    pub fn weight(&self, dimension: ScoreDimension) -> f64 {
        match dimension {
            ScoreDimension::Progress => self.progress_weight,
            ScoreDimension::Coverage => self.coverage_weight,
            ScoreDimension::Confidence => self.confidence_weight,
            ScoreDimension::Operational => self.operational_weight,
            ScoreDimension::Quality => self.quality_weight,
        }
    }
}

/// Tri-state health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RagStatus {
    Red,
    Amber,
    Green,
}

impl RagStatus {
    /// Worst first, so dashboards list trouble at the top.
    pub const fn ordered() -> [Self; 3] {
        [Self::Red, Self::Amber, Self::Green]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Amber => "AMBER",
            Self::Green => "GREEN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_score: u8,
    pub rag_status: RagStatus,
}

/// Weighted contribution of a single dimension, kept so a score can be audited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub dimension: ScoreDimension,
    pub label: &'static str,
    pub score: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// Stateless scorer bound to one weight configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(&self, input: &ScoreInput) -> ScoreResult {
        let total_score = compute_total_score(input, &self.weights);
        let rag_status = classify(f64::from(total_score), input.has_active_blocker, &self.weights);

        ScoreResult {
            total_score,
            rag_status,
        }
    }

    pub fn classify(&self, total_score: f64, has_active_blocker: bool) -> RagStatus {
        classify(total_score, has_active_blocker, &self.weights)
    }

    pub fn is_flagged(&self, variance: f64) -> bool {
        variance::is_flagged(variance, self.weights.variance_threshold)
    }

    pub fn breakdown(&self, input: &ScoreInput) -> Vec<ScoreComponent> {
        ScoreDimension::ordered()
            .into_iter()
            .map(|dimension| {
                let score = input.value(dimension);
                let weight = self.weights.weight(dimension);
                ScoreComponent {
                    dimension,
                    label: dimension.label(),
                    score,
                    weight,
                    contribution: score * weight,
                }
            })
            .collect()
    }
}

/// Weighted sum of the five sub-scores, rounded half away from zero and clamped
/// into 0..=100. Weights are applied as given, never renormalised.
pub fn compute_total_score(input: &ScoreInput, weights: &ScoringWeights) -> u8 {
    let raw: f64 = ScoreDimension::ordered()
        .into_iter()
        .map(|dimension| input.value(dimension) * weights.weight(dimension))
        .sum();

    let rounded = raw.round();
    if rounded.is_nan() {
        return 0;
    }

    rounded.clamp(0.0, 100.0) as u8
}

/// Rule order matters: an active blocker wins over any score.
pub fn classify(total_score: f64, has_active_blocker: bool, weights: &ScoringWeights) -> RagStatus {
    if has_active_blocker {
        RagStatus::Red
    } else if total_score >= weights.green_threshold {
        RagStatus::Green
    } else if total_score >= weights.amber_threshold {
        RagStatus::Amber
    } else {
        RagStatus::Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(score: f64) -> ScoreInput {
        ScoreInput {
            progress_score: score,
            coverage_score: score,
            confidence_score: score,
            operational_score: score,
            quality_score: score,
            has_active_blocker: false,
        }
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let weights = ScoringWeights {
            progress_weight: 1.0,
            coverage_weight: 0.0,
            confidence_weight: 0.0,
            operational_weight: 0.0,
            quality_weight: 0.0,
            ..ScoringWeights::default()
        };
        let mut input = uniform(0.0);

        input.progress_score = 62.5;
        assert_eq!(compute_total_score(&input, &weights), 63);
        input.progress_score = 64.5;
        assert_eq!(compute_total_score(&input, &weights), 65);
        input.progress_score = 64.49;
        assert_eq!(compute_total_score(&input, &weights), 64);
    }

    #[test]
    fn mixed_scores_use_each_weight() {
        let input = ScoreInput {
            progress_score: 80.0,
            coverage_score: 70.0,
            confidence_score: 60.0,
            operational_score: 90.0,
            quality_score: 50.0,
            has_active_blocker: false,
        };
        // 20 + 17.5 + 12 + 13.5 + 7.5
        assert_eq!(compute_total_score(&input, &ScoringWeights::default()), 71);
    }

    #[test]
    fn clamps_out_of_range_totals() {
        let weights = ScoringWeights::default();
        assert_eq!(compute_total_score(&uniform(250.0), &weights), 100);
        assert_eq!(compute_total_score(&uniform(-40.0), &weights), 0);
        assert_eq!(compute_total_score(&uniform(f64::NAN), &weights), 0);
    }

    #[test]
    fn does_not_renormalise_weights() {
        let weights = ScoringWeights {
            progress_weight: 0.5,
            coverage_weight: 0.5,
            confidence_weight: 0.5,
            operational_weight: 0.5,
            quality_weight: 0.5,
            ..ScoringWeights::default()
        };
        assert_eq!(compute_total_score(&uniform(10.0), &weights), 25);
    }

    #[test]
    fn blocker_overrides_perfect_score() {
        let weights = ScoringWeights::default();
        assert_eq!(classify(100.0, true, &weights), RagStatus::Red);
        assert_eq!(classify(100.0, false, &weights), RagStatus::Green);
    }

    #[test]
    fn breakdown_contributions_sum_to_raw_total() {
        let engine = ScoringEngine::default();
        let input = uniform(40.0);
        let components = engine.breakdown(&input);

        assert_eq!(components.len(), 5);
        let raw: f64 = components.iter().map(|c| c.contribution).sum();
        assert!((raw - 40.0).abs() < 1e-9);
        assert_eq!(components[0].label, "Progress");
    }

    #[test]
    fn rag_status_serializes_uppercase() {
        let json = serde_json::to_string(&RagStatus::Amber).expect("serialize");
        assert_eq!(json, "\"AMBER\"");
        assert!(RagStatus::Red < RagStatus::Green);
    }
}
