//! Percentile helpers over deviation samples.
//!
//! Percentiles use linear interpolation between order statistics: for a
//! sorted sample of size n at percentile p, the rank is `p / 100 * (n - 1)`
//! and the value is interpolated between the two surrounding elements.

/// Percentile of an already-sorted slice, `p` in [0, 100].
///
/// Returns 0.0 for an empty slice; callers validate emptiness upstream.
/// A single-element sample yields that element for every percentile.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Percentile of an unsorted slice (sorts a copy).
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, p)
}

/// The percentiles 1..=99 of a sorted sample, in order.
pub fn percentile_curve_sorted(sorted: &[f64]) -> Vec<f64> {
    (1..=99)
        .map(|p| percentile_sorted(sorted, p as f64))
        .collect()
}

/// First and third quartiles of an unsorted sample.
pub fn quartiles(values: &[f64]) -> (f64, f64) {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    (
        percentile_sorted(&sorted, 25.0),
        percentile_sorted(&sorted, 75.0),
    )
}
