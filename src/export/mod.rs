//! The tracking report and its output file.
//!
//! The report is a CSV-like text file: a few narrative header lines, an
//! optional line table, and the coordinate table.
//!
//! ```text
//! trial_03.kva Kinovea tracking processed
//! 30 fps
//! 640 x 480 px
//! Calibration was manual via 1 line(s), details below, ...
//! Name,Pixel L,Center_X,Center_Y,Units,True L
//! Line_1,40.0,0.5,0.58,mm,9.5
//! The data were filtered with zero-lag second-order Butterworth low-pass filter at cutoff frequency 5 Hz.
//! Original marker order was Dist_1_X, Dist_1_Y, Prox_1_X, Prox_1_Y
//! They were abbreviated as D1_X, D1_Y, P1_X, P1_Y and sorted to canonical order. Verify that these abbreviations match the originals.
//! Marker data are calibrated to mm.
//! Time,D1_X,D1_Y,P1_X,P1_Y
//! 0.0,73.625,58.1875,73.625,58.1875
//! ```
//!
//! # Structure
//!
//! - `columns` - Short-name mapping and canonical ordering
//! - `writer` - Number formatting and table rendering

mod columns;
mod writer;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

pub use columns::ColumnMapping;
pub use writer::{
    escape_cell, format_value, write_line_table, write_marker_table, LINE_DECIMALS,
    LINE_TABLE_HEADER, MARKER_DECIMALS,
};

use crate::annotation::{DrawnLine, FrameGeometry};
use crate::calibration::CalibrationOutcome;
use crate::tracks::{column_name, AlignedTable, Axis};

/// Everything a finished run writes out.
#[derive(Debug, Clone)]
pub struct TrackingReport {
    pub source_name: String,
    pub geometry: FrameGeometry,
    pub calibration: CalibrationOutcome,
    /// Normalized line rows with their true lengths
    pub lines: Vec<DrawnLine>,
    /// Filter cutoff in Hz
    pub cutoff: f64,
    pub mapping: ColumnMapping,
    /// Renamed, reordered, calibrated marker table
    pub table: AlignedTable,
}

fn axis_columns(names: &[String]) -> String {
    names
        .iter()
        .flat_map(|n| [column_name(n, Axis::X), column_name(n, Axis::Y)])
        .collect::<Vec<_>>()
        .join(", ")
}

impl TrackingReport {
    /// Narrative lines written before the line table.
    pub fn preamble(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{} Kinovea tracking processed", self.source_name),
            format!("{} fps", self.geometry.framerate_text),
            format!("{} x {} px", self.geometry.width, self.geometry.height),
        ];
        lines.extend(self.calibration.narrative());
        lines
    }

    /// Narrative lines written between the line table and the marker table.
    pub fn processing_notes(&self) -> Vec<String> {
        let order_note = if self.mapping.reorders() {
            "sorted to canonical order"
        } else {
            "kept in their order"
        };
        vec![
            format!(
                "The data were filtered with zero-lag second-order Butterworth low-pass filter at cutoff frequency {} Hz.",
                self.cutoff
            ),
            format!(
                "Original marker order was {}",
                axis_columns(&self.mapping.original)
            ),
            format!(
                "They were abbreviated as {} and {}. Verify that these abbreviations match the originals.",
                axis_columns(&self.mapping.short),
                order_note
            ),
            format!("Marker data are calibrated to {}.", self.calibration.unit),
        ]
    }

    /// Render the report to a sink.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for line in self.preamble() {
            writeln!(sink, "{}", line)?;
        }
        if self.calibration.is_manual() {
            write_line_table(sink, &self.lines)?;
        }
        for line in self.processing_notes() {
            writeln!(sink, "{}", line)?;
        }
        write_marker_table(sink, &self.table)
    }

    /// Render the whole report into memory.
    pub fn render(&self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Write the report to `path` in one go.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render()?)?;
        info!(path = %path.display(), rows = self.table.len(), "report written");
        Ok(())
    }
}

/// Default report path: next to the input, `<stem><suffix>.csv`.
///
/// ```
/// use std::path::Path;
/// use kvatrack::export::default_output_path;
///
/// let path = default_output_path(Path::new("/data/trial_03.kva"), "_Tracking");
/// assert_eq!(path, Path::new("/data/trial_03_Tracking.csv"));
/// ```
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tracking".to_string());
    input.with_file_name(format!("{}{}.csv", stem, suffix))
}
