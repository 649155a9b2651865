//! Unit tests for describing annotations without extracting

use super::helpers::fixture_path;
use kvatrack::calibration::CalibrationMode;
use kvatrack::{summarize, Annotation};

fn summary(name: &str) -> kvatrack::Summary {
    summarize(Annotation::load(fixture_path(name)).unwrap())
}

#[test]
fn manual_file_summary() {
    let summary = summary("four_markers_two_lines.kva");
    assert_eq!(summary.rows, 30);
    assert_eq!(summary.markers.len(), 4);
    assert_eq!(summary.lines.len(), 2);
    assert_eq!(summary.calibration_mode, Some(CalibrationMode::LinePerPair));
    assert!(summary.tool_calibration.is_none());
    assert_eq!(summary.time_jumps, 0);

    let text = summary.to_text();
    assert!(text.contains("Frame:       640 x 480 px at 30 fps"));
    assert!(text.contains("Dist_2 at (0.48, 0.51)"));
    assert!(text.contains("Line_2 at (0.17, 0.79), L=20.0 px"));
    assert!(text.contains("Calibration: none"));
}

#[test]
fn tool_file_summary() {
    let summary = summary("tool_calibrated.kva");
    assert_eq!(summary.calibration_mode, Some(CalibrationMode::Tool));
    let text = summary.to_text();
    assert!(text.contains("Calibration: 10 mm over 40.0 px, factor 0.25 mm/px"));
}

#[test]
fn unsupported_topology_is_explained() {
    let summary = summary("three_lines_four_markers.kva");
    assert_eq!(summary.calibration_mode, None);
    let problem = summary.calibration_problem.as_ref().unwrap();
    assert!(problem.contains("3 line(s)"));
    assert!(summary.to_text().contains("Mode:        unavailable"));
}

#[test]
fn summary_serializes_to_json() {
    let json = serde_json::to_value(summary("two_markers_one_line.kva")).unwrap();
    assert_eq!(json["source_name"], "two_markers_one_line.kva");
    assert_eq!(json["geometry"]["width"], 640);
    assert_eq!(json["calibration_mode"], "line_per_pair");
    assert_eq!(json["markers"][0]["name"], "Dist_1");
}
