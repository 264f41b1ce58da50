use serde::{Deserialize, Serialize};

/// One observed block: its self-reported timestamp plus the signed gap
/// between receipt time and that timestamp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockRecord {
    pub block_number: u64,
    pub block_timestamp_s: f64,
    /// Positive = block timestamp behind receipt time ("past"/honest),
    /// zero or negative = at/after receipt time ("future").
    pub deviation_ms: f64,
}

/// Per-chain ordered sample of timestamp deviations (milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSeries {
    pub chain: String,
    pub deviations: Vec<f64>,
    /// Raw per-block rows, present only for detailed sources. When present,
    /// `deviations` is their `deviation_ms` projection.
    pub records: Option<Vec<BlockRecord>>,
}

impl ChainSeries {
    /// Build a deltas-only series (no per-block timestamps).
    pub fn from_deltas(chain: impl Into<String>, deviations: Vec<f64>) -> Self {
        Self {
            chain: chain.into(),
            deviations,
            records: None,
        }
    }

    /// Build a detailed series. Input order is not trusted: rows are sorted
    /// by block number before the deviations are projected.
    pub fn from_records(chain: impl Into<String>, mut records: Vec<BlockRecord>) -> Self {
        records.sort_by_key(|r| r.block_number);
        let deviations = records.iter().map(|r| r.deviation_ms).collect();
        Self {
            chain: chain.into(),
            deviations,
            records: Some(records),
        }
    }

    pub fn len(&self) -> usize {
        self.deviations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deviations.is_empty()
    }

    /// True when the series carries raw per-block rows and can feed the
    /// trend analyses.
    pub fn is_detailed(&self) -> bool {
        self.records.is_some()
    }
}
