use crate::config::AnalyzeConfig;
use crate::error::AnalysisError;
use crate::metrics::batch::{simulate, BatchWindowReport};
use crate::metrics::classify::{classify, Classification};
use crate::metrics::summary::{summarize, SummaryStats};
use crate::metrics::trend::{analyze_trend, TrendReport};
use crate::series::ChainSeries;
use log::warn;
use serde::{Deserialize, Serialize};

/// Everything the engine computed for one chain, ready for a reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainReport {
    pub chain: String,
    pub summary: SummaryStats,
    pub batch: BatchWindowReport,
    pub classification: Classification,
    /// None for deltas-only sources or samples too small for trend analysis.
    pub trend: Option<TrendReport>,
}

/// Analyze one chain end to end. A missing or too-small trend sample
/// degrades to `trend: None`; summary or batch failures fail the chain.
pub fn analyze_chain(
    series: &ChainSeries,
    config: &AnalyzeConfig,
) -> Result<ChainReport, AnalysisError> {
    let summary = summarize(series)?;
    let batch = simulate(series, config.batch_window_ms)?;
    let classification = classify(&summary);
    let trend = match analyze_trend(series) {
        Ok(report) => Some(report),
        Err(AnalysisError::InsufficientSample {
            analysis,
            needed,
            actual,
        }) => {
            warn!(
                "skipping {} for {}: needs {} records, have {}",
                analysis, series.chain, needed, actual
            );
            None
        }
        Err(err) => return Err(err),
    };
    Ok(ChainReport {
        chain: series.chain.clone(),
        summary,
        batch,
        classification,
        trend,
    })
}

/// Analyze every chain, skipping any that fails. The worst case is an empty
/// result vector, never a run-wide failure.
pub fn analyze_all(series: &[ChainSeries], config: &AnalyzeConfig) -> Vec<ChainReport> {
    let mut reports = Vec::with_capacity(series.len());
    for s in series {
        match analyze_chain(s, config) {
            Ok(report) => reports.push(report),
            Err(err) => warn!("skipping chain {}: {}", s.chain, err),
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::BlockRecord;

    fn config() -> AnalyzeConfig {
        AnalyzeConfig::default()
    }

    #[test]
    fn deltas_only_chain_reports_without_trend() {
        let series = ChainSeries::from_deltas("Base", vec![100.0, 150.0, -50.0, 200.0, 120.0]);
        let report = analyze_chain(&series, &config()).unwrap();
        assert_eq!(report.chain, "Base");
        assert!(report.trend.is_none());
        assert_eq!(report.summary.past_count, 4);
        assert_eq!(report.batch.mis_count, 0);
    }

    #[test]
    fn detailed_chain_reports_with_trend() {
        let records: Vec<BlockRecord> = (0..40)
            .map(|i| BlockRecord {
                block_number: i + 1,
                block_timestamp_s: i as f64 * 2.0,
                deviation_ms: 100.0 + i as f64,
            })
            .collect();
        let series = ChainSeries::from_records("Optimism", records);
        let report = analyze_chain(&series, &config()).unwrap();
        assert!(report.trend.is_some());
    }

    #[test]
    fn empty_chain_is_skipped_but_others_survive() {
        let chains = vec![
            ChainSeries::from_deltas("Empty", Vec::new()),
            ChainSeries::from_deltas("Good", vec![10.0, 20.0, 30.0]),
        ];
        let reports = analyze_all(&chains, &config());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].chain, "Good");
    }

    #[test]
    fn no_usable_chain_yields_an_empty_result_set() {
        let chains = vec![ChainSeries::from_deltas("Empty", Vec::new())];
        assert!(analyze_all(&chains, &config()).is_empty());
    }

    #[test]
    fn report_round_trips_through_serde() {
        let series = ChainSeries::from_deltas("Base", vec![1.0, -2.0, 3.0]);
        let report = analyze_chain(&series, &config()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let back: ChainReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chain, report.chain);
        assert_eq!(back.summary.total, report.summary.total);
    }
}
