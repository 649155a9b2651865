//! Unit tests for reading Kinovea annotation files

use super::helpers::{fixture_path, load_fixture};
use kvatrack::{Annotation, ExtractError};

#[test]
fn reads_geometry_tracks_and_lines() {
    let annotation = Annotation::load(fixture_path("two_markers_one_line.kva")).unwrap();

    assert_eq!(annotation.source_name, "two_markers_one_line.kva");
    assert_eq!(annotation.geometry.width, 640);
    assert_eq!(annotation.geometry.height, 480);
    assert_eq!(annotation.geometry.framerate, 30.0);
    assert_eq!(annotation.geometry.framerate_text, "30");

    assert_eq!(annotation.markers, vec!["Dist_1", "Prox_1"]);
    assert_eq!(annotation.table.len(), 30);
    assert_eq!(annotation.table.marker_count(), 2);
    assert!(annotation.merges.iter().all(|m| m.is_lossless()));

    assert_eq!(annotation.lines.len(), 1);
    let line = &annotation.lines[0];
    assert_eq!(line.name, "Line_1");
    assert_eq!(line.pixel_length, 40.0);
}

#[test]
fn uncalibrated_file_has_no_tool_calibration() {
    let annotation = Annotation::load(fixture_path("two_markers_one_line.kva")).unwrap();
    assert!(annotation.calibration.is_some());
    assert!(annotation.tool_calibration().is_none());
}

#[test]
fn tool_calibration_is_read() {
    let annotation = Annotation::load(fixture_path("tool_calibrated.kva")).unwrap();
    let cal = annotation.tool_calibration().unwrap();
    assert_eq!(cal.length, 10.0);
    assert_eq!(cal.unit, "mm");
    assert_eq!(cal.pixel_length, 40.0);
    assert_eq!(cal.scale, 0.25);
    assert!(annotation.lines.is_empty());
}

#[test]
fn markers_keep_file_order() {
    let annotation = Annotation::load(fixture_path("four_markers_two_lines.kva")).unwrap();
    assert_eq!(
        annotation.markers,
        vec!["Dist_2", "Prox_2", "Dist_1", "Prox_1"]
    );
    assert_eq!(annotation.table.marker_names(), annotation.markers);
    let names: Vec<&str> = annotation.lines.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Line_1", "Line_2"]);
}

#[test]
fn time_base_follows_framerate() {
    let annotation = Annotation::load(fixture_path("two_markers_one_line.kva")).unwrap();
    let times = annotation.table.times();
    assert_eq!(times[0], 0.0);
    assert_eq!(times[1], 0.03);
    assert_eq!(times[3], 0.1);
    assert!(annotation.table.check_continuity().is_continuous());
}

#[test]
fn duplicate_track_names_are_rejected() {
    let content = load_fixture("two_markers_one_line.kva").replace("Prox_1", "Dist_1");
    let err = Annotation::parse_str("dup.kva", &content).unwrap_err();
    assert!(matches!(err, ExtractError::DuplicateMarkerName { .. }));
}

#[test]
fn truncated_file_is_rejected() {
    let content = load_fixture("two_markers_one_line.kva");
    let cut = content.rfind("</TrackPointList>").unwrap();
    let err = Annotation::parse_str("cut.kva", &content[..cut]).unwrap_err();
    assert!(matches!(err, ExtractError::MalformedAnnotationLine { .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Annotation::load(fixture_path("does_not_exist.kva")).unwrap_err();
    assert!(matches!(err, ExtractError::Io(_)));
}
