use assert_cmd::cargo::cargo_bin_cmd;
use drift_lib::metrics::summary::SummaryStats;
use std::{error::Error, path::PathBuf};

#[test]
fn summary_matches_fixture_counts() -> Result<(), Box<dyn Error>> {
    let input = sample_path("test_data/Testchain_deltas.csv");

    let mut cmd = cargo_bin_cmd!("drift");
    cmd.args(["summary", "--input", &input, "--chain", "Testchain"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let stats: SummaryStats = serde_json::from_slice(&output)?;

    assert_eq!(stats.total, 5);
    assert_eq!(stats.past_count, 4);
    assert_eq!(stats.future_count, 1);
    assert!((stats.future_pct - 20.0).abs() < 1e-9);
    assert!((stats.mean_ms - 104.0).abs() < 1e-9);
    assert_eq!(stats.max_ms, 200.0);
    assert_eq!(stats.min_ms, -50.0);
    Ok(())
}

#[test]
fn summary_fails_on_missing_input() {
    let mut cmd = cargo_bin_cmd!("drift");
    cmd.args(["summary", "--input", "does/not/exist.csv"]);
    cmd.assert().failure();
}

fn sample_path(relative: &str) -> String {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join(relative)
        .to_string_lossy()
        .to_string()
}
