use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

fn default_batch_window_ms() -> f64 {
    15_000.0
}

fn default_bin_width_ms() -> f64 {
    100.0
}

/// Analysis parameters, loadable from a TOML file and overridable by the
/// caller.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeConfig {
    /// Candidate batching window in milliseconds.
    #[serde(default = "default_batch_window_ms")]
    pub batch_window_ms: f64,
    /// Width of the frequency-distribution bins in milliseconds.
    #[serde(default = "default_bin_width_ms")]
    pub bin_width_ms: f64,
    /// Explicit chain filter; None analyzes every discovered chain.
    #[serde(default)]
    pub chains: Option<Vec<String>>,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            batch_window_ms: default_batch_window_ms(),
            bin_width_ms: default_bin_width_ms(),
            chains: None,
        }
    }
}

impl AnalyzeConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.batch_window_ms.is_finite() || self.batch_window_ms <= 0.0 {
            anyhow::bail!("batch_window_ms must be positive, got {}", self.batch_window_ms);
        }
        if !self.bin_width_ms.is_finite() || self.bin_width_ms <= 0.0 {
            anyhow::bail!("bin_width_ms must be positive, got {}", self.bin_width_ms);
        }
        Ok(())
    }
}

/// Read an analysis config from a TOML file.
pub fn read_config(path: &Path) -> Result<AnalyzeConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: AnalyzeConfig =
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
