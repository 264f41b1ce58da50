use crate::error::AnalysisError;
use crate::metrics::percentile::{percentile_curve_sorted, percentile_sorted};
use crate::series::ChainSeries;
use serde::{Deserialize, Serialize};

/// Named quantiles of the signed deviation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NamedQuantiles {
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub q95: f64,
    pub q99: f64,
}

/// Point statistics over one chain's deviation sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total: usize,
    /// Samples with deviation > 0 (block timestamp in the past).
    pub past_count: usize,
    pub past_pct: f64,
    /// Samples with deviation <= 0 (block timestamp at/after receipt).
    pub future_count: usize,
    pub future_pct: f64,
    pub mean_ms: f64,
    /// Largest deviation (most positive).
    pub max_ms: f64,
    /// Smallest deviation (most negative).
    pub min_ms: f64,
    /// Median of |deviation|; drives the accuracy tier.
    pub median_abs_ms: f64,
    /// Sample standard deviation of |deviation|.
    pub std_abs_ms: f64,
    pub quantiles: NamedQuantiles,
    /// Percentiles 1..=99 of the signed deviation.
    pub signed_percentiles: Vec<f64>,
    /// Percentiles 1..=99 of |deviation|.
    pub abs_percentiles: Vec<f64>,
}

/// Summarize a chain's sample. Rejects empty series before any division.
pub fn summarize(series: &ChainSeries) -> Result<SummaryStats, AnalysisError> {
    if series.is_empty() {
        return Err(AnalysisError::EmptySeries {
            chain: series.chain.clone(),
        });
    }

    let deviations = &series.deviations;
    let n = deviations.len();
    let total = n as f64;

    let past_count = deviations.iter().filter(|d| **d > 0.0).count();
    let future_count = n - past_count;

    let mean_ms = deviations.iter().sum::<f64>() / total;
    let max_ms = deviations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_ms = deviations.iter().copied().fold(f64::INFINITY, f64::min);

    let mut sorted_signed = deviations.clone();
    sorted_signed.sort_by(|a, b| a.total_cmp(b));
    let mut sorted_abs: Vec<f64> = deviations.iter().map(|d| d.abs()).collect();
    sorted_abs.sort_by(|a, b| a.total_cmp(b));

    let abs_mean = sorted_abs.iter().sum::<f64>() / total;
    let std_abs_ms = if n > 1 {
        (sorted_abs
            .iter()
            .map(|x| (x - abs_mean).powi(2))
            .sum::<f64>()
            / (total - 1.0))
            .sqrt()
    } else {
        0.0
    };

    let quantiles = NamedQuantiles {
        q25: percentile_sorted(&sorted_signed, 25.0),
        median: percentile_sorted(&sorted_signed, 50.0),
        q75: percentile_sorted(&sorted_signed, 75.0),
        q95: percentile_sorted(&sorted_signed, 95.0),
        q99: percentile_sorted(&sorted_signed, 99.0),
    };

    Ok(SummaryStats {
        total: n,
        past_count,
        past_pct: past_count as f64 / total * 100.0,
        future_count,
        future_pct: future_count as f64 / total * 100.0,
        mean_ms,
        max_ms,
        min_ms,
        median_abs_ms: percentile_sorted(&sorted_abs, 50.0),
        std_abs_ms,
        quantiles,
        signed_percentiles: percentile_curve_sorted(&sorted_signed),
        abs_percentiles: percentile_curve_sorted(&sorted_abs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_counts_for_mixed_sample() {
        let series = ChainSeries::from_deltas("X", vec![100.0, 150.0, -50.0, 200.0, 120.0]);
        let stats = summarize(&series).unwrap();
        assert_eq!(stats.past_count, 4);
        assert_eq!(stats.future_count, 1);
        assert!((stats.future_pct - 20.0).abs() < 1e-12);
        assert!((stats.past_pct - 80.0).abs() < 1e-12);
        assert_eq!(stats.max_ms, 200.0);
        assert_eq!(stats.min_ms, -50.0);
    }

    #[test]
    fn all_positive_sample_has_no_future_share() {
        let series = ChainSeries::from_deltas("X", vec![10.0, 20.0, 30.0]);
        let stats = summarize(&series).unwrap();
        assert_eq!(stats.future_count, 0);
        assert_eq!(stats.future_pct, 0.0);
        assert_eq!(stats.past_pct, 100.0);
    }

    #[test]
    fn zero_deviation_counts_as_future() {
        let series = ChainSeries::from_deltas("X", vec![0.0, 5.0]);
        let stats = summarize(&series).unwrap();
        assert_eq!(stats.future_count, 1);
    }

    #[test]
    fn percentile_curve_bracketed_by_extremes() {
        let series = ChainSeries::from_deltas("X", vec![100.0, 150.0, -50.0, 200.0, 120.0]);
        let stats = summarize(&series).unwrap();
        assert_eq!(stats.signed_percentiles.len(), 99);
        assert!(stats.min_ms <= stats.signed_percentiles[0]);
        assert!(stats.signed_percentiles[98] <= stats.max_ms);
        assert!(stats.signed_percentiles[0] <= stats.quantiles.median);
        assert!(stats.quantiles.median <= stats.signed_percentiles[98]);
    }

    #[test]
    fn single_sample_quantiles_collapse() {
        let series = ChainSeries::from_deltas("X", vec![42.0]);
        let stats = summarize(&series).unwrap();
        assert_eq!(stats.quantiles.q25, 42.0);
        assert_eq!(stats.quantiles.q99, 42.0);
        assert_eq!(stats.std_abs_ms, 0.0);
    }

    #[test]
    fn empty_series_is_rejected() {
        let series = ChainSeries::from_deltas("X", Vec::new());
        match summarize(&series) {
            Err(AnalysisError::EmptySeries { chain }) => assert_eq!(chain, "X"),
            other => panic!("expected EmptySeries, got {:?}", other.map(|_| ())),
        }
    }
}
