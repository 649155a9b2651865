//! Unit tests for whole extraction runs on fixture files

use super::helpers::{fixture_path, report_lines};
use kvatrack::calibration::{CalibrationMode, Length, PairingSource};
use kvatrack::prompt::ScriptedInput;
use kvatrack::{extract, AcceptDefaults, Annotation, Config, ExtractError, ExtractOptions};

fn load(name: &str) -> Annotation {
    Annotation::load(fixture_path(name)).unwrap()
}

// ============================================================================
// Single pair, single line
// ============================================================================

#[test]
fn one_line_per_pair_with_defaults() {
    let report = extract(
        load("two_markers_one_line.kva"),
        &Config::default(),
        &ExtractOptions::default(),
        &mut AcceptDefaults,
    )
    .unwrap();

    assert_eq!(report.calibration.mode, CalibrationMode::LinePerPair);
    assert_eq!(report.calibration.unit, "mm");
    assert_eq!(report.calibration.pairings.len(), 1);
    assert_eq!(report.calibration.pairings[0].source, PairingSource::Suffix);

    let lines = report_lines(&report);
    assert_eq!(lines[0], "two_markers_one_line.kva Kinovea tracking processed");
    assert_eq!(lines[1], "30 fps");
    assert_eq!(lines[2], "640 x 480 px");
    assert!(lines[3].starts_with("Calibration was manual via 1 line(s)"));
    assert_eq!(lines[4], "Name,Pixel L,Center_X,Center_Y,Units,True L");
    assert_eq!(lines[5], "Line_1,40.0,0.5,0.58,mm,9.5");
    assert!(lines[6].ends_with("at cutoff frequency 5 Hz."));
    assert_eq!(
        lines[7],
        "Original marker order was Dist_1_X, Dist_1_Y, Prox_1_X, Prox_1_Y"
    );
    assert!(lines[8].contains("abbreviated as D1_X, D1_Y, P1_X, P1_Y and kept in their order"));
    assert_eq!(lines[9], "Marker data are calibrated to mm.");
    assert_eq!(lines[10], "Time,D1_X,D1_Y,P1_X,P1_Y");
    assert_eq!(lines[11], "0.0,73.625,58.1875,73.625,58.1875");
    assert_eq!(lines.len(), 11 + 30);
}

#[test]
fn line_length_override_changes_scale() {
    let mut options = ExtractOptions::default();
    options
        .calibration
        .line_lengths
        .insert("Line_1".to_string(), Length::new(19.0, "mm"));

    let report = extract(
        load("two_markers_one_line.kva"),
        &Config::default(),
        &options,
        &mut AcceptDefaults,
    )
    .unwrap();

    let lines = report_lines(&report);
    assert_eq!(lines[5], "Line_1,40.0,0.5,0.58,mm,19.0");
    assert_eq!(lines[11], "0.0,147.25,116.375,147.25,116.375");
}

#[test]
fn rows_follow_the_time_base() {
    let report = extract(
        load("two_markers_one_line.kva"),
        &Config::default(),
        &ExtractOptions::default(),
        &mut AcceptDefaults,
    )
    .unwrap();

    let lines = report_lines(&report);
    assert!(lines[12].starts_with("0.03,"));
    assert!(lines[14].starts_with("0.1,"));
    assert!(lines[40].starts_with("0.97,"));
}

// ============================================================================
// Two pairs, two lines
// ============================================================================

#[test]
fn pairs_are_matched_by_suffix_and_sorted() {
    let options = ExtractOptions {
        column_order: Some("D2,P2,D1,P1".to_string()),
        ..Default::default()
    };
    let report = extract(
        load("four_markers_two_lines.kva"),
        &Config::default(),
        &options,
        &mut AcceptDefaults,
    )
    .unwrap();

    let pairings = &report.calibration.pairings;
    assert_eq!(pairings[0].markers, ["Dist_1".to_string(), "Prox_1".to_string()]);
    assert_eq!(pairings[1].markers, ["Dist_2".to_string(), "Prox_2".to_string()]);

    let lines = report_lines(&report);
    assert!(lines[3].starts_with("Calibration was manual via 2 line(s)"));
    assert_eq!(lines[5], "Line_1,40.0,0.5,0.58,mm,9.5");
    assert_eq!(lines[6], "Line_2,20.0,0.17,0.79,mm,9.5");
    assert!(lines[9].contains("sorted to canonical order"));
    assert_eq!(lines[11], "Time,D1_X,D1_Y,P1_X,P1_Y,D2_X,D2_Y,P2_X,P2_Y");
    assert_eq!(
        lines[12],
        "0.0,73.625,58.1875,73.625,58.1875,147.25,116.375,147.25,116.375"
    );
}

#[test]
fn scripted_session_retries_a_bad_length() {
    let mut input = ScriptedInput::new(["ten mm", "", "", "", "", "", "D2,P2,D1,P1"]);
    let report = extract(
        load("four_markers_two_lines.kva"),
        &Config::default(),
        &ExtractOptions::default(),
        &mut input,
    )
    .unwrap();

    assert_eq!(input.remaining(), 0);
    assert_eq!(input.prompts().len(), 7);
    assert!(input.prompts()[0].contains("Line_1"));
    assert!(input.prompts()[3].contains("Markers calibrated by Line_1"));
    assert!(input.messages()[0].starts_with("Normalized coordinates"));
    assert!(input.messages()[1].starts_with("4 markers detected"));
    assert_eq!(report.mapping.short, vec!["D2", "P2", "D1", "P1"]);
}

#[test]
fn marker_claimed_twice_is_rejected_when_not_interactive() {
    let options = ExtractOptions {
        calibration: kvatrack::calibration::CalibrationAnswers {
            pairs: [
                ("Line_1".to_string(), "Dist_1,Prox_1".to_string()),
                ("Line_2".to_string(), "Dist_1,Prox_2".to_string()),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = extract(
        load("four_markers_two_lines.kva"),
        &Config::default(),
        &options,
        &mut AcceptDefaults,
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidAnswer { .. }));
}

#[test]
fn three_lines_for_four_markers_is_unsupported() {
    let err = extract(
        load("three_lines_four_markers.kva"),
        &Config::default(),
        &ExtractOptions::default(),
        &mut AcceptDefaults,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::UnsupportedCalibrationTopology {
            lines: 3,
            markers: 4
        }
    ));
}

// ============================================================================
// Tool calibration
// ============================================================================

#[test]
fn tool_scale_applies_to_both_markers() {
    let mut input = ScriptedInput::new(["", ""]);
    let report = extract(
        load("tool_calibrated.kva"),
        &Config::default(),
        &ExtractOptions::default(),
        &mut input,
    )
    .unwrap();

    assert_eq!(report.calibration.mode, CalibrationMode::Tool);
    assert_eq!(input.prompts().len(), 2);
    assert!(input.messages()[0].contains("factor 0.25 mm/px"));

    let lines = report_lines(&report);
    assert!(lines[3].starts_with("Automatic calibration with factor 0.25 mm/px"));
    assert!(lines[5].contains("cutoff frequency 5 Hz"));
    assert_eq!(lines[9], "Time,D1_X,D1_Y,P1_X,P1_Y");
    assert_eq!(lines[10], "0.0,77.5,61.25,77.5,61.25");
}

#[test]
fn cutoff_above_nyquist_is_fatal_when_given_up_front() {
    let options = ExtractOptions {
        cutoff: Some(15.0),
        ..Default::default()
    };
    let err = extract(
        load("tool_calibrated.kva"),
        &Config::default(),
        &options,
        &mut AcceptDefaults,
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidCutoffFrequency { .. }));
}

#[test]
fn config_changes_defaults() {
    let config = Config::from_toml(
        "[filter]\ncutoff_hz = 3.0\n[calibration]\npair_line_length = 1.9\npair_line_unit = \"cm\"\n",
    )
    .unwrap();
    let report = extract(
        load("two_markers_one_line.kva"),
        &config,
        &ExtractOptions::default(),
        &mut AcceptDefaults,
    )
    .unwrap();

    assert_eq!(report.cutoff, 3.0);
    assert_eq!(report.calibration.unit, "cm");
    let lines = report_lines(&report);
    assert_eq!(lines[9], "Marker data are calibrated to cm.");
    assert_eq!(lines[11], "0.0,14.725,11.6375,14.725,11.6375");
}
