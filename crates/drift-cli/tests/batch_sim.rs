use assert_cmd::cargo::cargo_bin_cmd;
use drift_lib::metrics::batch::BatchWindowReport;
use drift_lib::metrics::classify::ReliabilityTier;
use std::{error::Error, path::PathBuf};

#[test]
fn default_window_keeps_fixture_blocks_in_their_batches() -> Result<(), Box<dyn Error>> {
    let input = sample_path("test_data/Testchain_deltas.csv");

    let mut cmd = cargo_bin_cmd!("drift");
    cmd.args(["batch-sim", "--input", &input, "--chain", "Testchain"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let report: BatchWindowReport = serde_json::from_slice(&output)?;

    assert_eq!(report.window_ms, 15000.0);
    assert_eq!(report.mis_count, 0);
    assert_eq!(report.correct_count, 5);
    assert_eq!(report.reliability, ReliabilityTier::ExtremelyReliable);
    // 2 * p99 stays under the 5 second floor for this sample
    assert_eq!(report.recommended_window_ms, 5000.0);
    assert!((report.buffered_window_ms - 6000.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn tight_window_misassigns_every_large_deviation() -> Result<(), Box<dyn Error>> {
    let input = sample_path("test_data/Testchain_deltas.csv");

    let mut cmd = cargo_bin_cmd!("drift");
    cmd.args([
        "batch-sim",
        "--input",
        &input,
        "--chain",
        "Testchain",
        "--window-ms",
        "100",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let report: BatchWindowReport = serde_json::from_slice(&output)?;

    // deltas 150, 200 and 120 exceed the window; 100 sits exactly on it
    assert_eq!(report.mis_count, 3);
    assert_eq!(report.past_mis_count, 3);
    assert_eq!(report.future_mis_count, 0);
    Ok(())
}

#[test]
fn nonpositive_window_is_rejected() {
    let input = sample_path("test_data/Testchain_deltas.csv");
    let mut cmd = cargo_bin_cmd!("drift");
    cmd.args([
        "batch-sim",
        "--input",
        &input,
        "--window-ms",
        "0",
    ]);
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
