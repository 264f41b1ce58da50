use assert_cmd::cargo::cargo_bin_cmd;
use drift_lib::metrics::trend::{DriftDirection, TrendReport};
use std::{error::Error, path::PathBuf};

#[test]
fn step_change_fixture_degrades_with_a_shift_at_the_boundary() -> Result<(), Box<dyn Error>> {
    let input = sample_path("test_data/Stepchain_detailed.csv");

    let mut cmd = cargo_bin_cmd!("drift");
    cmd.args(["trend", "--input", &input, "--chain", "Stepchain"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let report: TrendReport = serde_json::from_slice(&output)?;

    assert_eq!(report.sample_count, 40);
    assert_eq!(report.drift.direction, DriftDirection::Degrading);
    assert!(report.drift.second_half_mean_ms > report.drift.first_half_mean_ms);

    let shifts = report.shifts.expect("40 records allow the shift scan");
    assert!(!shifts.points.is_empty());
    assert_eq!(shifts.points[0].index, 20);

    // Uniform 2 second block gaps leave the correlation undefined
    assert!(report.correlation.is_none());
    Ok(())
}

#[test]
fn deltas_only_input_cannot_feed_trend_analysis() {
    let input = sample_path("test_data/Testchain_deltas.csv");
    let mut cmd = cargo_bin_cmd!("drift");
    cmd.args(["trend", "--input", &input]);
    // the deltas file is missing the block number/timestamp columns
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
