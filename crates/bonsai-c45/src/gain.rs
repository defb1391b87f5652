//! Entropy arithmetic shared by split evaluation and selection.

/// Comparison slack for weights and gain ratios.
pub(crate) const PRECISION: f64 = 1e-6;

/// Slack applied to the average-gain cutoff during attribute selection.
pub(crate) const EPSILON: f64 = 1e-3;

/// The `w * log2(w)` building block of weighted entropy; zero for `w <= 0`.
pub(crate) fn weight_entropy(weight: f64) -> f64 {
    if weight > 0.0 {
        weight * weight.log2()
    } else {
        0.0
    }
}

/// Entropy in bits of a weighted distribution.
///
/// Works for both class distributions (information content) and branch
/// weight distributions (split information). Returns zero when the total
/// weight is not positive.
pub(crate) fn distribution_entropy(weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let summed: f64 = weights.iter().map(|&w| weight_entropy(w)).sum();
    (weight_entropy(total) - summed) / total
}

/// Gain ratio of a candidate split; `None` when the split information
/// carries no signal.
pub(crate) fn gain_ratio(gain: f64, split_info: f64) -> Option<f64> {
    if split_info <= PRECISION {
        return None;
    }
    Some(gain / split_info)
}
