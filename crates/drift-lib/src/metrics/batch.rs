use crate::error::AnalysisError;
use crate::metrics::classify::{reliability_tier, ReliabilityTier};
use crate::metrics::percentile::percentile;
use crate::series::ChainSeries;
use serde::{Deserialize, Serialize};

/// Minimum window the recommendation will ever return, in milliseconds.
pub const MIN_RECOMMENDED_WINDOW_MS: f64 = 5000.0;

/// Outcome of assigning a chain's blocks to time-based batches of a given
/// window. A block lands in the wrong batch when |deviation| exceeds the
/// window; mis-assignments are split by the sign of the deviation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchWindowReport {
    pub window_ms: f64,
    pub total: usize,
    pub correct_count: usize,
    pub mis_count: usize,
    pub mis_pct: f64,
    /// Future timestamps pushing blocks into an earlier batch.
    pub future_mis_count: usize,
    pub future_mis_pct: f64,
    /// Past timestamps pushing blocks into a later batch.
    pub past_mis_count: usize,
    pub past_mis_pct: f64,
    pub p99_abs_ms: f64,
    /// `max(2 * p99(|deviation|), 5000)`.
    pub recommended_window_ms: f64,
    /// Recommended window with a 20% buffer on top.
    pub buffered_window_ms: f64,
    pub reliability: ReliabilityTier,
}

/// Simulate batching with the given window. The window must be a positive,
/// finite number of milliseconds.
pub fn simulate(series: &ChainSeries, window_ms: f64) -> Result<BatchWindowReport, AnalysisError> {
    if !window_ms.is_finite() || window_ms <= 0.0 {
        return Err(AnalysisError::InvalidWindow { value: window_ms });
    }
    if series.is_empty() {
        return Err(AnalysisError::EmptySeries {
            chain: series.chain.clone(),
        });
    }

    let deviations = &series.deviations;
    let total = deviations.len();

    let mut future_mis_count = 0usize;
    let mut past_mis_count = 0usize;
    for &d in deviations {
        if d.abs() > window_ms {
            if d < 0.0 {
                future_mis_count += 1;
            } else {
                past_mis_count += 1;
            }
        }
    }
    let mis_count = future_mis_count + past_mis_count;
    let pct = |count: usize| count as f64 / total as f64 * 100.0;

    let abs: Vec<f64> = deviations.iter().map(|d| d.abs()).collect();
    let p99_abs_ms = percentile(&abs, 99.0);
    let recommended_window_ms = (2.0 * p99_abs_ms).max(MIN_RECOMMENDED_WINDOW_MS);

    Ok(BatchWindowReport {
        window_ms,
        total,
        correct_count: total - mis_count,
        mis_count,
        mis_pct: pct(mis_count),
        future_mis_count,
        future_mis_pct: pct(future_mis_count),
        past_mis_count,
        past_mis_pct: pct(past_mis_count),
        p99_abs_ms,
        recommended_window_ms,
        buffered_window_ms: recommended_window_ms * 1.2,
        reliability: reliability_tier(pct(mis_count)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(deviations: Vec<f64>) -> ChainSeries {
        ChainSeries::from_deltas("X", deviations)
    }

    #[test]
    fn counts_match_exact_threshold_rule() {
        let s = series(vec![100.0, -150.0, 3000.0, -4000.0, 50.0]);
        let report = simulate(&s, 1000.0).unwrap();
        assert_eq!(report.mis_count, 2);
        assert_eq!(report.past_mis_count, 1);
        assert_eq!(report.future_mis_count, 1);
        assert_eq!(report.correct_count, 3);
        assert!((report.mis_pct - 40.0).abs() < 1e-12);
    }

    #[test]
    fn boundary_deviation_is_correctly_bucketed() {
        // |deviation| == window is still the right bucket
        let s = series(vec![1000.0, -1000.0, 1000.1]);
        let report = simulate(&s, 1000.0).unwrap();
        assert_eq!(report.mis_count, 1);
        assert_eq!(report.past_mis_count, 1);
    }

    #[test]
    fn shrinking_the_window_never_decreases_mis_count() {
        let s = series(vec![10.0, -250.0, 600.0, 1200.0, -80.0, 4500.0, 30.0]);
        let mut last = 0usize;
        for window in [10000.0, 4000.0, 1000.0, 500.0, 100.0, 5.0] {
            let report = simulate(&s, window).unwrap();
            assert!(report.mis_count >= last);
            last = report.mis_count;
        }
    }

    #[test]
    fn mis_count_matches_exhaustive_count_on_random_data() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(42);
        let deviations: Vec<f64> = (0..500)
            .map(|_| rng.gen_range(-20_000.0..20_000.0))
            .collect();
        let s = series(deviations.clone());
        for window in [100.0, 1000.0, 5000.0, 15_000.0] {
            let report = simulate(&s, window).unwrap();
            let expected = deviations.iter().filter(|d| d.abs() > window).count();
            assert_eq!(report.mis_count, expected);
            assert_eq!(report.correct_count + report.mis_count, report.total);
        }
    }

    #[test]
    fn constant_sample_recommends_the_floor() {
        let s = series(vec![500.0; 64]);
        let report = simulate(&s, 15000.0).unwrap();
        assert_eq!(report.mis_count, 0);
        assert_eq!(report.reliability, ReliabilityTier::ExtremelyReliable);
        // 2 * p99 = 1000 is below the 5 second floor
        assert_eq!(report.recommended_window_ms, 5000.0);
        assert!((report.buffered_window_ms - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn recommendation_respects_floor_and_p99() {
        let s = series((1..=100).map(|i| i as f64 * 100.0).collect());
        let report = simulate(&s, 15000.0).unwrap();
        assert!(report.recommended_window_ms >= MIN_RECOMMENDED_WINDOW_MS);
        assert!(report.recommended_window_ms >= 2.0 * report.p99_abs_ms);
    }

    #[test]
    fn rejects_nonpositive_window() {
        let s = series(vec![1.0]);
        assert!(matches!(
            simulate(&s, 0.0),
            Err(AnalysisError::InvalidWindow { .. })
        ));
        assert!(matches!(
            simulate(&s, f64::NAN),
            Err(AnalysisError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn rejects_empty_series() {
        let s = series(Vec::new());
        assert!(matches!(
            simulate(&s, 1000.0),
            Err(AnalysisError::EmptySeries { .. })
        ));
    }
}
