use serde::{Deserialize, Serialize};

/// One frequency bin: counts deviations in `[lower_ms, upper_ms)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bin {
    pub lower_ms: f64,
    pub upper_ms: f64,
    pub count: usize,
}

/// Bin deviations into fixed-width buckets aligned to multiples of
/// `bin_width_ms`. Returns no bins for an empty sample or a non-positive
/// width.
pub fn bin_deviations(values: &[f64], bin_width_ms: f64) -> Vec<Bin> {
    if values.is_empty() || !bin_width_ms.is_finite() || bin_width_ms <= 0.0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let start = (min / bin_width_ms).floor() * bin_width_ms;
    let bins = ((max - start) / bin_width_ms).floor() as usize + 1;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - start) / bin_width_ms).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lower_ms: start + i as f64 * bin_width_ms,
            upper_ms: start + (i + 1) as f64 * bin_width_ms,
            count,
        })
        .collect()
}
