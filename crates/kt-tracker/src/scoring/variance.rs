/// Absolute point gap between two organisations' totals for the same week.
pub fn calculate(total_a: f64, total_b: f64) -> f64 {
    (total_a - total_b).abs()
}

/// Strictly greater than: a variance equal to the threshold is tolerated.
pub fn is_flagged(variance: f64, threshold: f64) -> bool {
    variance > threshold
}

/// Variance for a pair of optional totals. A missing counterpart report means
/// there is nothing to compare, which is not the same as zero variance.
pub fn between(total_a: Option<f64>, total_b: Option<f64>) -> Option<f64> {
    match (total_a, total_b) {
        (Some(a), Some(b)) => Some(calculate(a, b)),
        _ => None,
    }
}
