//! One extraction run, from scanned annotation to finished report.
//!
//! The stages run in a fixed order and every one of them may abort the run:
//!
//! 1. Normalize marker and line coordinates
//! 2. Calibrate (tool scale, line per pair, or single line)
//! 3. Check time continuity (warning only)
//! 4. Resolve the cutoff and filter every coordinate column
//! 5. Map markers to canonical short names
//! 6. Undo the frame-size normalization
//!
//! Nothing is written here; the caller saves the returned report, so an
//! aborted run never leaves a partial file behind.

use serde::Serialize;
use tracing::{info, warn};

use crate::annotation::{Annotation, DrawnLine, FrameGeometry, ToolCalibration};
use crate::calibration::{self, CalibrationAnswers, CalibrationMode};
use crate::config::Config;
use crate::error::{ExtractError, Result};
use crate::export::{ColumnMapping, TrackingReport};
use crate::filter::{filter_table, parse_cutoff_answer, validate_cutoff, LowPass};
use crate::normalize::{denormalize_markers, normalize_lines, normalize_markers};
use crate::prompt::{ask_until_valid, InputSource};
use crate::tracks::{AlignedTable, MergeReport};

/// Answers fixed before the run starts.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Filter cutoff in Hz
    pub cutoff: Option<f64>,
    pub calibration: CalibrationAnswers,
    /// Short names in current marker order, e.g. `"P1,D1"`
    pub column_order: Option<String>,
}

/// Mean normalized position of one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSummary {
    pub name: String,
    pub mean_x: Option<f64>,
    pub mean_y: Option<f64>,
}

impl std::fmt::Display for MarkerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.mean_x, self.mean_y) {
            (Some(x), Some(y)) => write!(f, "{} at ({:.2}, {:.2})", self.name, x, y),
            _ => write!(f, "{} (no samples)", self.name),
        }
    }
}

fn describe_line(line: &DrawnLine) -> String {
    format!(
        "{} at ({:.2}, {:.2}), L={:.1} px",
        line.name, line.center_x, line.center_y, line.pixel_length
    )
}

fn marker_summaries(table: &AlignedTable) -> Vec<MarkerSummary> {
    table
        .markers()
        .iter()
        .map(|m| {
            let mean = m.mean_position();
            MarkerSummary {
                name: m.name.clone(),
                mean_x: mean.map(|p| p.0),
                mean_y: mean.map(|p| p.1),
            }
        })
        .collect()
}

/// Run every stage on a scanned annotation.
pub fn extract(
    annotation: Annotation,
    config: &Config,
    options: &ExtractOptions,
    input: &mut dyn InputSource,
) -> Result<TrackingReport> {
    if annotation.table.marker_count() == 0 {
        return Err(ExtractError::NoMarkerTracks);
    }

    let tool = annotation.tool_calibration().cloned();
    let Annotation {
        source_name,
        geometry,
        mut table,
        mut lines,
        ..
    } = annotation;

    normalize_markers(&mut table, &geometry);
    normalize_lines(&mut lines, &geometry);

    if tool.is_none() {
        input.say("Normalized coordinates are used until calibration, origin bottom-left, X rightwards, Y upwards.");
        let markers: Vec<String> = marker_summaries(&table)
            .iter()
            .map(|m| m.to_string())
            .collect();
        input.say(&format!(
            "{} markers detected, on average at: {}",
            markers.len(),
            markers.join("; ")
        ));
        let described: Vec<String> = lines.iter().map(describe_line).collect();
        input.say(&format!(
            "{} lines detected, centered at: {}",
            described.len(),
            described.join("; ")
        ));
    }

    let outcome = calibration::calibrate(
        &mut table,
        &mut lines,
        tool.as_ref(),
        &config.calibration_settings(),
        &options.calibration,
        &mut *input,
    )?;

    let continuity = table.check_continuity();
    if !continuity.is_continuous() {
        warn!(
            jumps = continuity.jumps.len(),
            mean_step = continuity.mean_step,
            "time index is not continuous, filtering may introduce artifacts"
        );
        input.say("Data entries are not time-continuous, there are jumps. Filtering might introduce artifacts. Consider re-tracking.");
    }

    let cutoff = resolve_cutoff(&geometry, config, options, &mut *input)?;
    let filter = LowPass::new(cutoff, geometry.framerate)?;
    filter_table(&mut table, &filter);
    info!(cutoff, framerate = geometry.framerate, "filtered marker columns");

    let mapping = resolve_mapping(&table, config, options, &mut *input)?;
    mapping.apply(&mut table);

    denormalize_markers(&mut table, &geometry);

    Ok(TrackingReport {
        source_name,
        geometry,
        calibration: outcome,
        lines,
        cutoff,
        mapping,
        table,
    })
}

fn resolve_cutoff(
    geometry: &FrameGeometry,
    config: &Config,
    options: &ExtractOptions,
    input: &mut dyn InputSource,
) -> Result<f64> {
    if let Some(cutoff) = options.cutoff {
        return validate_cutoff(cutoff, geometry.framerate);
    }
    let default = config.filter.cutoff_hz;
    let prompt = format!(
        "Sampling rate is {} fps. Cutoff frequency of the zero-lag second-order Butterworth filter in Hz [{}]:",
        geometry.framerate_text, default
    );
    ask_until_valid(input, &prompt, |answer| {
        parse_cutoff_answer(answer, default, geometry.framerate)
    })
}

fn resolve_mapping(
    table: &AlignedTable,
    config: &Config,
    options: &ExtractOptions,
    input: &mut dyn InputSource,
) -> Result<ColumnMapping> {
    let markers: Vec<String> = table.marker_names().iter().map(|s| s.to_string()).collect();
    let canonical = &config.export.canonical_names;

    if let Some(order) = &options.column_order {
        return ColumnMapping::parse(order, &markers, canonical);
    }
    let prompt = format!(
        "Markers will be renamed and ordered {}. Current order is {}. Enter if it matches, or type the short names comma-separated in the current order:",
        canonical.join(", "),
        markers.join(", ")
    );
    ask_until_valid(input, &prompt, |answer| {
        ColumnMapping::parse(answer, &markers, canonical)
    })
}

/// What `inspect` reports about an annotation.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub source_name: String,
    pub geometry: FrameGeometry,
    pub rows: usize,
    /// Mean normalized positions
    pub markers: Vec<MarkerSummary>,
    /// Normalized line rows
    pub lines: Vec<DrawnLine>,
    pub tool_calibration: Option<ToolCalibration>,
    pub merges: Vec<MergeReport>,
    pub mean_time_step: f64,
    pub time_jumps: usize,
    /// Mode `extract` would take, if any
    pub calibration_mode: Option<CalibrationMode>,
    /// Why no mode applies
    pub calibration_problem: Option<String>,
}

/// Normalize and describe an annotation without asking anything.
pub fn summarize(annotation: Annotation) -> Summary {
    let tool_calibration = annotation.tool_calibration().cloned();
    let Annotation {
        source_name,
        geometry,
        mut table,
        mut lines,
        merges,
        ..
    } = annotation;

    normalize_markers(&mut table, &geometry);
    normalize_lines(&mut lines, &geometry);

    let (calibration_mode, calibration_problem) = if table.marker_count() == 0 {
        (None, Some(ExtractError::NoMarkerTracks.to_string()))
    } else {
        match calibration::plan(tool_calibration.as_ref(), &lines, table.marker_count()) {
            Ok(plan) => (Some(plan.mode()), None),
            Err(err) => (None, Some(err.to_string())),
        }
    };
    let continuity = table.check_continuity();

    Summary {
        source_name,
        rows: table.len(),
        markers: marker_summaries(&table),
        geometry,
        lines,
        tool_calibration,
        merges,
        mean_time_step: continuity.mean_step,
        time_jumps: continuity.jumps.len(),
        calibration_mode,
        calibration_problem,
    }
}

impl Summary {
    /// Human-readable description, one item per line.
    pub fn to_text(&self) -> String {
        let mut out = vec![
            format!("File:        {}", self.source_name),
            format!(
                "Frame:       {} x {} px at {} fps",
                self.geometry.width, self.geometry.height, self.geometry.framerate_text
            ),
            format!("Rows:        {}", self.rows),
        ];

        match &self.tool_calibration {
            Some(cal) => out.push(format!(
                "Calibration: {} {} over {:.1} px, factor {} {}/px",
                cal.length, cal.unit, cal.pixel_length, cal.scale, cal.unit
            )),
            None => out.push("Calibration: none (coordinates in pixels)".to_string()),
        }
        match (&self.calibration_mode, &self.calibration_problem) {
            (Some(mode), _) => out.push(format!("Mode:        {:?}", mode)),
            (None, Some(problem)) => out.push(format!("Mode:        unavailable: {}", problem)),
            (None, None) => {}
        }

        out.push(format!("Markers ({}):", self.markers.len()));
        out.extend(self.markers.iter().map(|m| format!("  {}", m)));
        out.push(format!("Lines ({}):", self.lines.len()));
        out.extend(self.lines.iter().map(|l| format!("  {}", describe_line(l))));

        for merge in self.merges.iter().filter(|m| !m.is_lossless()) {
            out.push(format!(
                "Warning: {} has {} sample(s) outside the time index and {} empty row(s)",
                merge.marker, merge.dropped, merge.unfilled
            ));
        }
        if self.time_jumps > 0 {
            out.push(format!(
                "Warning: {} jump(s) in time (mean step {:.4} s)",
                self.time_jumps, self.mean_time_step
            ));
        }
        out.join("\n")
    }
}
