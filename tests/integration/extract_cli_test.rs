//! CLI tests for `kvatrack extract`

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use super::helpers::temp_fixture;

/// kvatrack with an isolated home directory, so no user config is read
fn kvatrack(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kvatrack").unwrap();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Successful runs
// ============================================================================

#[test]
fn non_interactive_run_writes_report_next_to_input() {
    let (dir, input) = temp_fixture("two_markers_one_line.kva");
    let expected = dir.path().join("two_markers_one_line_Tracking.csv");

    kvatrack(&dir)
        .arg("extract")
        .arg(&input)
        .arg("--non-interactive")
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let report = fs::read_to_string(&expected).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "two_markers_one_line.kva Kinovea tracking processed");
    assert_eq!(lines[5], "Line_1,40.0,0.5,0.58,mm,9.5");
    assert_eq!(lines[11], "0.0,73.625,58.1875,73.625,58.1875");
}

#[test]
fn overrides_and_explicit_output() {
    let (dir, input) = temp_fixture("four_markers_two_lines.kva");
    let output = dir.path().join("out.csv");

    kvatrack(&dir)
        .arg("extract")
        .arg(&input)
        .args(["--non-interactive", "--cutoff", "4"])
        .args(["--line-length", "Line_2=19 mm"])
        .args(["--pair", "Line_2=Dist_2,Prox_2"])
        .args(["--order", "D2,P2,D1,P1"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let report = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[6], "Line_2,20.0,0.17,0.79,mm,19.0");
    assert!(lines[7].contains("cutoff frequency 4 Hz"));
    assert_eq!(lines[11], "Time,D1_X,D1_Y,P1_X,P1_Y,D2_X,D2_Y,P2_X,P2_Y");
    assert_eq!(
        lines[12],
        "0.0,73.625,58.1875,73.625,58.1875,294.5,232.75,294.5,232.75"
    );
}

#[test]
fn piped_answers_are_read_in_order() {
    let (dir, input) = temp_fixture("two_markers_one_line.kva");

    // Length, pair, cutoff, column order
    kvatrack(&dir)
        .arg("extract")
        .arg(&input)
        .write_stdin("19 mm\n\n3\nP1,D1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("True length of Line_1"));

    let report =
        fs::read_to_string(dir.path().join("two_markers_one_line_Tracking.csv")).unwrap();
    assert!(report.contains("cutoff frequency 3 Hz"));
    assert!(report.contains("Time,D1_X,D1_Y,P1_X,P1_Y"));
    assert!(report.contains("0.0,147.25,116.375,147.25,116.375"));
}

#[test]
fn tool_calibrated_file_needs_no_line_answers() {
    let (dir, input) = temp_fixture("tool_calibrated.kva");

    kvatrack(&dir)
        .arg("extract")
        .arg(&input)
        .write_stdin("\n\n")
        .assert()
        .success();

    let report = fs::read_to_string(dir.path().join("tool_calibrated_Tracking.csv")).unwrap();
    assert!(report.contains("Automatic calibration with factor 0.25 mm/px"));
    assert!(!report.contains("Name,Pixel L"));
    assert!(report.contains("0.0,77.5,61.25,77.5,61.25"));
}

#[test]
fn config_file_sets_suffix() {
    let (dir, input) = temp_fixture("two_markers_one_line.kva");
    let config = dir.path().join("custom.toml");
    fs::write(&config, "[export]\noutput_suffix = \"_tracks\"\n").unwrap();

    kvatrack(&dir)
        .arg("extract")
        .arg(&input)
        .arg("--non-interactive")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(dir.path().join("two_markers_one_line_tracks.csv").exists());
}

#[test]
fn bad_piped_answer_is_asked_again() {
    let (dir, input) = temp_fixture("two_markers_one_line.kva");

    // Bad length, then length, pair, cutoff, column order
    kvatrack(&dir)
        .arg("extract")
        .arg(&input)
        .write_stdin("a lot\n9.5 mm\n\n\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Could not understand 'a lot'"));

    let report =
        fs::read_to_string(dir.path().join("two_markers_one_line_Tracking.csv")).unwrap();
    assert!(report.contains("0.0,73.625,58.1875,73.625,58.1875"));
}

// ============================================================================
// Failures leave nothing behind
// ============================================================================

#[test]
fn unsupported_topology_fails_without_output() {
    let (dir, input) = temp_fixture("three_lines_four_markers.kva");

    kvatrack(&dir)
        .arg("extract")
        .arg(&input)
        .arg("--non-interactive")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported calibration: 3 line(s)"));

    assert!(!dir
        .path()
        .join("three_lines_four_markers_Tracking.csv")
        .exists());
}

#[test]
fn bad_piped_answer_then_end_of_input_is_fatal() {
    let (dir, input) = temp_fixture("two_markers_one_line.kva");

    kvatrack(&dir)
        .arg("extract")
        .arg(&input)
        .write_stdin("a lot\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input ended"));

    assert!(!dir.path().join("two_markers_one_line_Tracking.csv").exists());
}

#[test]
fn running_out_of_answers_is_fatal() {
    let (dir, input) = temp_fixture("two_markers_one_line.kva");

    kvatrack(&dir)
        .arg("extract")
        .arg(&input)
        .write_stdin("\n")
        .assert()
        .failure();

    assert!(!dir.path().join("two_markers_one_line_Tracking.csv").exists());
}

#[test]
fn cutoff_at_nyquist_is_rejected() {
    let (dir, input) = temp_fixture("two_markers_one_line.kva");

    kvatrack(&dir)
        .arg("extract")
        .arg(&input)
        .args(["--non-interactive", "--cutoff", "15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("15"));
}

#[test]
fn malformed_line_length_is_rejected_before_reading() {
    let dir = TempDir::new().unwrap();

    kvatrack(&dir)
        .args(["extract", "missing.kva", "--line-length", "Line_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LINE=VALUE"));
}

#[test]
fn missing_input_file_fails() {
    let dir = TempDir::new().unwrap();

    kvatrack(&dir)
        .arg("extract")
        .arg(dir.path().join("missing.kva"))
        .arg("--non-interactive")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read annotation"));
}
