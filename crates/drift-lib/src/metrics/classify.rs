use crate::metrics::summary::SummaryStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accuracy tier, driven by the median absolute deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccuracyTier {
    Excellent,
    Good,
    Moderate,
    Lower,
}

/// Variability tier, driven by the standard deviation of |deviation|.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariabilityTier {
    Low,
    Moderate,
    High,
}

/// Compliance tier, driven by the share of future timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceTier {
    HighlyCompliant,
    MostlyCompliant,
    LessCompliant,
}

/// Reliability tier for time-based batching, driven by the mis-bucketed
/// percentage of the batch simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReliabilityTier {
    ExtremelyReliable,
    VeryReliable,
    Reliable,
    ModeratelyReliable,
    LessReliable,
}

pub fn accuracy_tier(median_abs_ms: f64) -> AccuracyTier {
    if median_abs_ms < 200.0 {
        AccuracyTier::Excellent
    } else if median_abs_ms < 500.0 {
        AccuracyTier::Good
    } else if median_abs_ms < 1000.0 {
        AccuracyTier::Moderate
    } else {
        AccuracyTier::Lower
    }
}

pub fn variability_tier(std_abs_ms: f64) -> VariabilityTier {
    if std_abs_ms < 300.0 {
        VariabilityTier::Low
    } else if std_abs_ms < 800.0 {
        VariabilityTier::Moderate
    } else {
        VariabilityTier::High
    }
}

pub fn compliance_tier(future_pct: f64) -> ComplianceTier {
    if future_pct < 5.0 {
        ComplianceTier::HighlyCompliant
    } else if future_pct < 15.0 {
        ComplianceTier::MostlyCompliant
    } else {
        ComplianceTier::LessCompliant
    }
}

pub fn reliability_tier(mis_pct: f64) -> ReliabilityTier {
    if mis_pct < 1.0 {
        ReliabilityTier::ExtremelyReliable
    } else if mis_pct < 2.0 {
        ReliabilityTier::VeryReliable
    } else if mis_pct < 5.0 {
        ReliabilityTier::Reliable
    } else if mis_pct < 10.0 {
        ReliabilityTier::ModeratelyReliable
    } else {
        ReliabilityTier::LessReliable
    }
}

/// Human-facing tiers derived from a chain's summary statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Classification {
    pub accuracy: AccuracyTier,
    pub variability: VariabilityTier,
    pub compliance: ComplianceTier,
}

pub fn classify(summary: &SummaryStats) -> Classification {
    Classification {
        accuracy: accuracy_tier(summary.median_abs_ms),
        variability: variability_tier(summary.std_abs_ms),
        compliance: compliance_tier(summary.future_pct),
    }
}

impl fmt::Display for AccuracyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccuracyTier::Excellent => write!(f, "excellent"),
            AccuracyTier::Good => write!(f, "good"),
            AccuracyTier::Moderate => write!(f, "moderate"),
            AccuracyTier::Lower => write!(f, "lower"),
        }
    }
}

impl fmt::Display for VariabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariabilityTier::Low => write!(f, "low"),
            VariabilityTier::Moderate => write!(f, "moderate"),
            VariabilityTier::High => write!(f, "high"),
        }
    }
}

impl fmt::Display for ComplianceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceTier::HighlyCompliant => write!(f, "highly compliant"),
            ComplianceTier::MostlyCompliant => write!(f, "mostly compliant"),
            ComplianceTier::LessCompliant => write!(f, "less compliant"),
        }
    }
}

impl fmt::Display for ReliabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReliabilityTier::ExtremelyReliable => write!(f, "extremely reliable"),
            ReliabilityTier::VeryReliable => write!(f, "very reliable"),
            ReliabilityTier::Reliable => write!(f, "reliable"),
            ReliabilityTier::ModeratelyReliable => write!(f, "moderately reliable"),
            ReliabilityTier::LessReliable => write!(f, "less reliable"),
        }
    }
}
