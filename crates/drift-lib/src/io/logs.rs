use crate::error::AnalysisError;
use crate::series::{BlockRecord, ChainSeries};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

const DELTAS_SUFFIX: &str = "_deltas.csv";
const DETAILED_SUFFIX: &str = "_detailed.csv";
const STATS_SUFFIX: &str = "_stats.csv";

/// Summary row the logger precomputes alongside the raw deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecomputedStats {
    #[serde(rename = "Chain")]
    pub chain: String,
    #[serde(rename = "Total Blocks")]
    pub total_blocks: u64,
    #[serde(rename = "Past Timestamp Blocks")]
    pub past_blocks: u64,
    #[serde(rename = "Future Timestamp Blocks")]
    pub future_blocks: u64,
    #[serde(rename = "Max Past Delta (ms)")]
    pub max_past_delta_ms: f64,
    #[serde(rename = "Max Future Delta (ms)")]
    pub max_future_delta_ms: f64,
    #[serde(rename = "Avg Delta (ms)")]
    pub avg_delta_ms: f64,
}

/// One chain's sample plus the logger's own summary row when present.
#[derive(Debug, Clone)]
pub struct LoadedChain {
    pub series: ChainSeries,
    pub precomputed: Option<PrecomputedStats>,
}

/// List chains with a deltas file in the logs directory, sorted by name.
pub fn discover_chains(logs_dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(logs_dir)
        .with_context(|| format!("reading logs directory {}", logs_dir.display()))?;
    let mut chains = Vec::new();
    for entry in entries {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            if let Some(chain) = name.strip_suffix(DELTAS_SUFFIX) {
                chains.push(chain.to_string());
            }
        }
    }
    chains.sort();
    Ok(chains)
}

fn locate_column(headers: &csv::StringRecord, requested: &str) -> Result<usize> {
    headers
        .iter()
        .position(|name| name.eq_ignore_ascii_case(requested))
        .ok_or_else(|| anyhow::anyhow!("missing column {:?}", requested))
}

/// Read a deltas-only CSV: a header row with a "Delta (ms)" column.
pub fn read_deltas_csv(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(file);
    let headers = reader.headers().context("reading header")?.clone();
    let delta_idx = locate_column(&headers, "Delta (ms)")?;

    let mut deltas = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading row {}", row + 1))?;
        let value: f64 = record
            .get(delta_idx)
            .ok_or_else(|| anyhow::anyhow!("row {} is missing the delta field", row + 1))?
            .parse()
            .with_context(|| format!("parsing delta on row {}", row + 1))?;
        deltas.push(value);
    }
    Ok(deltas)
}

/// Read a detailed CSV: "Block Number", "Block Timestamp (s)", "Delta (ms)".
pub fn read_detailed_csv(path: &Path) -> Result<Vec<BlockRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(file);
    let headers = reader.headers().context("reading header")?.clone();
    let number_idx = locate_column(&headers, "Block Number")?;
    let timestamp_idx = locate_column(&headers, "Block Timestamp (s)")?;
    let delta_idx = locate_column(&headers, "Delta (ms)")?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading row {}", row + 1))?;
        let field = |idx: usize, name: &str| -> Result<&str> {
            record
                .get(idx)
                .ok_or_else(|| anyhow::anyhow!("row {} is missing {}", row + 1, name))
        };
        records.push(BlockRecord {
            block_number: field(number_idx, "block number")?
                .parse()
                .with_context(|| format!("parsing block number on row {}", row + 1))?,
            block_timestamp_s: field(timestamp_idx, "block timestamp")?
                .parse()
                .with_context(|| format!("parsing block timestamp on row {}", row + 1))?,
            deviation_ms: field(delta_idx, "delta")?
                .parse()
                .with_context(|| format!("parsing delta on row {}", row + 1))?,
        });
    }
    Ok(records)
}

/// Read the single-row precomputed stats CSV the logger writes per chain.
pub fn read_stats_csv(path: &Path) -> Result<PrecomputedStats> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("opening stats {}", path.display()))?;
    reader
        .deserialize::<PrecomputedStats>()
        .next()
        .ok_or_else(|| anyhow::anyhow!("stats file {} has no rows", path.display()))?
        .with_context(|| format!("parsing stats {}", path.display()))
}

fn chain_file(logs_dir: &Path, chain: &str, suffix: &str) -> PathBuf {
    logs_dir.join(format!("{}{}", chain, suffix))
}

/// Load one chain, preferring the detailed file (which enables trend
/// analysis) over the deltas-only file.
pub fn load_chain(logs_dir: &Path, chain: &str) -> Result<ChainSeries> {
    let detailed = chain_file(logs_dir, chain, DETAILED_SUFFIX);
    if detailed.exists() {
        let records = read_detailed_csv(&detailed)?;
        info!("loaded {} detailed blocks for {}", records.len(), chain);
        return Ok(ChainSeries::from_records(chain, records));
    }
    let deltas_path = chain_file(logs_dir, chain, DELTAS_SUFFIX);
    if deltas_path.exists() {
        let deltas = read_deltas_csv(&deltas_path)?;
        info!("loaded {} blocks for {}", deltas.len(), chain);
        return Ok(ChainSeries::from_deltas(chain, deltas));
    }
    Err(AnalysisError::MissingData {
        chain: chain.to_string(),
    }
    .into())
}

/// Load every requested chain (or every discovered chain when no filter is
/// given). Chains that fail to load are skipped with a warning; the run
/// continues with the rest.
pub fn load_chains(logs_dir: &Path, chains: Option<&[String]>) -> Result<Vec<LoadedChain>> {
    let names: Vec<String> = match chains {
        Some(filter) => filter.to_vec(),
        None => discover_chains(logs_dir)?,
    };

    let mut loaded = Vec::new();
    for chain in &names {
        let series = match load_chain(logs_dir, chain) {
            Ok(series) => series,
            Err(err) => {
                warn!("skipping chain {}: {}", chain, err);
                continue;
            }
        };
        let stats_path = chain_file(logs_dir, chain, STATS_SUFFIX);
        let precomputed = if stats_path.exists() {
            match read_stats_csv(&stats_path) {
                Ok(stats) => Some(stats),
                Err(err) => {
                    warn!("ignoring stats for {}: {}", chain, err);
                    None
                }
            }
        } else {
            None
        };
        loaded.push(LoadedChain {
            series,
            precomputed,
        });
    }
    Ok(loaded)
}
