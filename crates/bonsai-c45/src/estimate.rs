//! Pessimistic error estimate used by confidence-based pruning.

/// Confidence level of the one-sided binomial upper bound.
const CONFIDENCE: f64 = 0.25;

/// Squared normal deviate matching [`CONFIDENCE`].
const DEVIATION_SQ: f64 = 0.6925 * 0.6925;

/// Additional errors expected beyond the observed `error` when `total`
/// weight reaches a leaf, at the [`CONFIDENCE`] level.
///
/// Piecewise upper bound on the binomial error rate: an exact bound for a
/// clean leaf, an interpolation below one observed error, and a normal
/// approximation above. Saturates at `0.67 * (total - error)` when the
/// observed error nearly exhausts the leaf.
pub(crate) fn extra_error(total: f64, error: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    if error < 1e-6 {
        return total * (1.0 - CONFIDENCE.powf(1.0 / total));
    }
    if error < 0.9999 {
        let clean = total * (1.0 - CONFIDENCE.powf(1.0 / total));
        return clean + error * (extra_error(total, 1.0) - clean);
    }
    if error + 0.5 >= total {
        return 0.67 * (total - error);
    }
    let centered = error + 0.5;
    let rate = (centered
        + DEVIATION_SQ / 2.0
        + (DEVIATION_SQ * (centered * (1.0 - centered / total) + DEVIATION_SQ / 4.0)).sqrt())
        / (total + DEVIATION_SQ);
    total * rate - error
}
