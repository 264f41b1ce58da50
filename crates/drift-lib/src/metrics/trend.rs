use crate::error::AnalysisError;
use crate::metrics::percentile::quartiles;
use crate::series::{BlockRecord, ChainSeries};
use serde::{Deserialize, Serialize};

/// Minimum records before any trend analysis runs.
pub const TREND_MIN_RECORDS: usize = 10;
/// Minimum records for the gap/accuracy correlation.
pub const CORRELATION_MIN_RECORDS: usize = 3;
/// Minimum records before the shift scan runs.
pub const SHIFT_MIN_RECORDS: usize = 30;
/// Shift points listed in full; anything beyond is only counted.
pub const MAX_REPORTED_SHIFTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftDirection {
    Stable,
    Improving,
    Degrading,
}

/// First-half vs second-half comparison of mean |deviation|.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub first_half_mean_ms: f64,
    pub second_half_mean_ms: f64,
    /// Relative change in percent; None when the first half averages zero.
    pub relative_pct: Option<f64>,
    pub direction: DriftDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationVerdict {
    NoCorrelation,
    SlowerBlocksLessAccurate,
    FasterBlocksLessAccurate,
}

/// Pearson correlation between consecutive-block time gaps and |deviation|.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub coefficient: f64,
    pub verdict: CorrelationVerdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlierSeverity {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutlierPoint {
    pub index: usize,
    pub block_number: u64,
    pub deviation_ms: f64,
}

/// IQR outlier scan over |deviation|: anything above
/// `Q3 + 1.5 * (Q3 - Q1)` is flagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierReport {
    pub q1_ms: f64,
    pub q3_ms: f64,
    pub threshold_ms: f64,
    pub points: Vec<OutlierPoint>,
    pub rate_pct: f64,
    pub severity: OutlierSeverity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShiftPoint {
    pub index: usize,
    pub block_number: u64,
    pub before_mean_ms: f64,
    pub after_mean_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftReport {
    pub window: usize,
    /// First detected shift points, at most `MAX_REPORTED_SHIFTS`.
    pub points: Vec<ShiftPoint>,
    /// How many further shift points were found but not listed.
    pub unreported: usize,
}

/// Tail of the rolling statistics, for quick "recent behaviour" readouts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RollingSnapshot {
    pub window: usize,
    pub latest_mean_ms: f64,
    pub latest_std_ms: f64,
}

/// Temporal behaviour of one chain's deviations, over a block-number-sorted
/// copy of its records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub sample_count: usize,
    pub rolling: RollingSnapshot,
    pub drift: DriftReport,
    /// None when fewer than 3 records exist or the correlation is undefined.
    pub correlation: Option<CorrelationReport>,
    pub outliers: OutlierReport,
    /// None when fewer than 30 records exist.
    pub shifts: Option<ShiftReport>,
}

impl std::fmt::Display for DriftDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriftDirection::Stable => write!(f, "stable"),
            DriftDirection::Improving => write!(f, "improving"),
            DriftDirection::Degrading => write!(f, "degrading"),
        }
    }
}

impl std::fmt::Display for CorrelationVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationVerdict::NoCorrelation => write!(f, "no correlation"),
            CorrelationVerdict::SlowerBlocksLessAccurate => {
                write!(f, "slower blocks less accurate")
            }
            CorrelationVerdict::FasterBlocksLessAccurate => {
                write!(f, "faster blocks less accurate")
            }
        }
    }
}

impl std::fmt::Display for OutlierSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlierSeverity::Low => write!(f, "low"),
            OutlierSeverity::Moderate => write!(f, "moderate"),
            OutlierSeverity::High => write!(f, "high"),
        }
    }
}

/// Rolling mean over windows of `window` consecutive values. Each window is
/// recomputed from its own slice; no running state is carried between
/// positions.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Rolling sample standard deviation over windows of `window` values,
/// recomputed independently per position like `rolling_mean`.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 || values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| {
            let mean = w.iter().sum::<f64>() / window as f64;
            (w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0)).sqrt()
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn half_drift(abs: &[f64]) -> DriftReport {
    let mid = abs.len() / 2;
    let first = mean(&abs[..mid]);
    let second = mean(&abs[mid..]);
    let relative = if first == 0.0 {
        None
    } else {
        Some((second - first) / first * 100.0)
    };
    let direction = match relative {
        Some(r) if r.abs() < 5.0 => DriftDirection::Stable,
        Some(r) if r < 0.0 => DriftDirection::Improving,
        Some(_) => DriftDirection::Degrading,
        // First half was exactly zero: any nonzero second half is a regression.
        None if second > 0.0 => DriftDirection::Degrading,
        None => DriftDirection::Stable,
    };
    DriftReport {
        first_half_mean_ms: first,
        second_half_mean_ms: second,
        relative_pct: relative,
        direction,
    }
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x > 0.0 && var_y > 0.0 {
        Some(cov / (var_x.sqrt() * var_y.sqrt()))
    } else {
        None
    }
}

/// Correlate each block's |deviation| with the time gap from its
/// predecessor. Positive correlation means slower blocks are less accurate.
fn gap_correlation(records: &[BlockRecord], abs: &[f64]) -> Option<CorrelationReport> {
    if records.len() < CORRELATION_MIN_RECORDS {
        return None;
    }
    let gaps: Vec<f64> = records
        .windows(2)
        .map(|w| w[1].block_timestamp_s - w[0].block_timestamp_s)
        .collect();
    let coefficient = pearson(&gaps, &abs[1..])?;
    let verdict = if coefficient.abs() < 0.2 {
        CorrelationVerdict::NoCorrelation
    } else if coefficient > 0.0 {
        CorrelationVerdict::SlowerBlocksLessAccurate
    } else {
        CorrelationVerdict::FasterBlocksLessAccurate
    };
    Some(CorrelationReport {
        coefficient,
        verdict,
    })
}

fn find_outliers(records: &[BlockRecord], abs: &[f64]) -> OutlierReport {
    let (q1, q3) = quartiles(abs);
    let threshold = q3 + 1.5 * (q3 - q1);
    let points: Vec<OutlierPoint> = records
        .iter()
        .enumerate()
        .filter(|(i, _)| abs[*i] > threshold)
        .map(|(i, r)| OutlierPoint {
            index: i,
            block_number: r.block_number,
            deviation_ms: r.deviation_ms,
        })
        .collect();
    let rate_pct = points.len() as f64 / abs.len() as f64 * 100.0;
    let severity = if rate_pct > 10.0 {
        OutlierSeverity::High
    } else if rate_pct > 5.0 {
        OutlierSeverity::Moderate
    } else {
        OutlierSeverity::Low
    };
    OutlierReport {
        q1_ms: q1,
        q3_ms: q3,
        threshold_ms: threshold,
        points,
        rate_pct,
        severity,
    }
}

/// Scan interior indices for abrupt level changes: index `i` is a shift
/// point when the mean |deviation| of the following window departs from the
/// preceding window's mean by more than twice the preceding window's
/// standard deviation.
fn detect_shifts(records: &[BlockRecord], abs: &[f64], window: usize) -> Option<ShiftReport> {
    let n = abs.len();
    if n < SHIFT_MIN_RECORDS {
        return None;
    }
    let means = rolling_mean(abs, window);
    let stds = rolling_std(abs, window);

    let mut points = Vec::new();
    let mut unreported = 0usize;
    for i in window..=(n - window) {
        let before_mean = means[i - window];
        let after_mean = means[i];
        let noise = stds[i - window];
        if (after_mean - before_mean).abs() > 2.0 * noise {
            if points.len() < MAX_REPORTED_SHIFTS {
                points.push(ShiftPoint {
                    index: i,
                    block_number: records[i].block_number,
                    before_mean_ms: before_mean,
                    after_mean_ms: after_mean,
                });
            } else {
                unreported += 1;
            }
        }
    }
    Some(ShiftReport {
        window,
        points,
        unreported,
    })
}

/// Run every temporal analysis over a detailed series. Needs at least
/// `TREND_MIN_RECORDS` raw records; deltas-only series cannot be analyzed.
pub fn analyze_trend(series: &ChainSeries) -> Result<TrendReport, AnalysisError> {
    let records = series.records.as_deref().unwrap_or(&[]);
    if records.len() < TREND_MIN_RECORDS {
        return Err(AnalysisError::InsufficientSample {
            analysis: "trend analysis",
            needed: TREND_MIN_RECORDS,
            actual: records.len(),
        });
    }

    // Work on a sorted copy; the caller's ordering is not trusted.
    let mut records = records.to_vec();
    records.sort_by_key(|r| r.block_number);
    let abs: Vec<f64> = records.iter().map(|r| r.deviation_ms.abs()).collect();

    let n = abs.len();
    let window = 20.min(n / 2);
    let means = rolling_mean(&abs, window);
    let stds = rolling_std(&abs, window);
    let rolling = RollingSnapshot {
        window,
        latest_mean_ms: means.last().copied().unwrap_or(0.0),
        latest_std_ms: stds.last().copied().unwrap_or(0.0),
    };

    Ok(TrendReport {
        sample_count: n,
        rolling,
        drift: half_drift(&abs),
        correlation: gap_correlation(&records, &abs),
        outliers: find_outliers(&records, &abs),
        shifts: detect_shifts(&records, &abs, window),
    })
}
