use thiserror::Error;

/// Failures the engine can report. All are recoverable at the per-chain or
/// per-sub-analysis granularity; callers skip the failed unit and continue.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No sample exists for the requested chain.
    #[error("no data found for chain {chain}")]
    MissingData { chain: String },

    /// A sample exists but holds zero rows. Raised before any statistic is
    /// computed so no division by zero can propagate NaN.
    #[error("chain {chain} has no usable samples")]
    EmptySeries { chain: String },

    /// An analysis needs more rows than the sample provides.
    #[error("{analysis} needs at least {needed} records, have {actual}")]
    InsufficientSample {
        analysis: &'static str,
        needed: usize,
        actual: usize,
    },

    /// Batch windows must be positive and finite.
    #[error("batch window must be a positive number of milliseconds, got {value}")]
    InvalidWindow { value: f64 },
}
