//! CLI tests for `kvatrack inspect`

use assert_cmd::Command;
use predicates::prelude::*;

use super::helpers::temp_fixture;

#[test]
fn inspect_prints_text_summary() {
    let (dir, input) = temp_fixture("four_markers_two_lines.kva");

    Command::cargo_bin("kvatrack")
        .unwrap()
        .env("HOME", dir.path())
        .arg("inspect")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Markers (4):"))
        .stdout(predicate::str::contains("Lines (2):"))
        .stdout(predicate::str::contains("LinePerPair"));

    // Inspecting writes nothing
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn inspect_json_is_parseable() {
    let (dir, input) = temp_fixture("tool_calibrated.kva");

    let output = Command::cargo_bin("kvatrack")
        .unwrap()
        .env("HOME", dir.path())
        .arg("inspect")
        .arg(&input)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["calibration_mode"], "tool");
    assert_eq!(json["tool_calibration"]["scale"], 0.25);
    assert_eq!(json["rows"], 30);
}
