//! Drawn reference lines and the tool's own calibration block.

use serde::Serialize;

use crate::error::{ExtractError, Result};

/// Round to a fixed number of decimals.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

// ============================================================================
// Drawn Lines
// ============================================================================

/// A user-drawn reference segment.
///
/// Coordinates start in raw pixel space (origin top-left, Y down) and are
/// rewritten by [`crate::normalize::normalize_lines`]. `pixel_length` always
/// stays in pixels since calibration scales are derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnLine {
    pub name: String,
    pub pixel_length: f64,
    pub center_x: f64,
    pub center_y: f64,
    /// Physical length assigned during manual calibration
    pub true_length: Option<f64>,
    /// Unit of `true_length`
    pub unit: Option<String>,
}

impl DrawnLine {
    /// Build a line row from its two endpoints.
    pub fn from_endpoints(name: impl Into<String>, start: (f64, f64), end: (f64, f64)) -> Self {
        Self {
            name: name.into(),
            pixel_length: distance(start, end),
            center_x: (start.0 + end.0) / 2.0,
            center_y: (start.1 + end.1) / 2.0,
            true_length: None,
            unit: None,
        }
    }

    /// Physical units per pixel, once a true length is known.
    pub fn scale(&self) -> Option<f64> {
        self.true_length.map(|length| length / self.pixel_length)
    }
}

/// Line rows accumulated during the scan.
///
/// Rows only become part of the result when a drawings section closes; rows
/// appended after the last `</Drawings>` are discarded by [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct LineTable {
    rows: Vec<DrawnLine>,
    committed: Option<usize>,
}

impl LineTable {
    pub fn push(&mut self, line: DrawnLine) {
        self.rows.push(line);
    }

    /// Commit every row seen so far.
    pub fn finalize(&mut self) {
        self.committed = Some(self.rows.len());
    }

    /// Number of rows seen, committed or not.
    pub fn pending_len(&self) -> usize {
        self.rows.len()
    }

    /// Consume the table, keeping only committed rows.
    pub fn finish(mut self) -> Vec<DrawnLine> {
        let keep = self.committed.unwrap_or(0);
        self.rows.truncate(keep);
        self.rows
    }
}

// ============================================================================
// Tool Calibration
// ============================================================================

/// The annotation tool's calibration record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCalibration {
    /// Known physical length of the segment
    pub length: f64,
    /// Unit of `length`
    pub unit: String,
    pub a: (f64, f64),
    pub b: (f64, f64),
    pub pixel_length: f64,
    /// Physical units per pixel, rounded to 4 decimals
    pub scale: f64,
}

impl ToolCalibration {
    /// Whether this record is the tool's "not calibrated" placeholder.
    ///
    /// The tool writes a calibration block even for uncalibrated videos, with
    /// the length equal to the pixel length. A scale of exactly 1 therefore
    /// means "no calibration". A genuine 1:1 calibration cannot be told apart.
    pub fn is_sentinel(&self) -> bool {
        self.scale == 1.0
    }
}

/// Collects calibration fields line by line.
///
/// Fields arrive in a fixed order: length, endpoint A, endpoint B, unit. The
/// pixel length is derived as soon as B is seen and the scale once the unit
/// is known.
#[derive(Debug, Default)]
pub struct CalibrationBuilder {
    length: Option<f64>,
    a: Option<(f64, f64)>,
    b: Option<(f64, f64)>,
    pixel_length: Option<f64>,
}

impl CalibrationBuilder {
    pub fn set_length(&mut self, length: f64) {
        self.length = Some(length);
    }

    pub fn set_a(&mut self, a: (f64, f64)) {
        self.a = Some(a);
    }

    /// Record endpoint B and derive the pixel length.
    pub fn set_b(&mut self, b: (f64, f64), line: usize) -> Result<()> {
        let a = self
            .a
            .ok_or_else(|| ExtractError::malformed(line, "calibration endpoint B before A"))?;
        self.b = Some(b);
        self.pixel_length = Some(distance(a, b));
        Ok(())
    }

    /// Record the unit and produce the finished calibration.
    pub fn finish(&mut self, unit: &str, line: usize) -> Result<ToolCalibration> {
        let length = self
            .length
            .ok_or_else(|| ExtractError::malformed(line, "calibration unit before <Length>"))?;
        let (a, b, pixel_length) = match (self.a, self.b, self.pixel_length) {
            (Some(a), Some(b), Some(px)) => (a, b, px),
            _ => {
                return Err(ExtractError::malformed(
                    line,
                    "calibration unit before both endpoints",
                ))
            }
        };
        if pixel_length == 0.0 {
            return Err(ExtractError::malformed(
                line,
                "calibration endpoints coincide",
            ));
        }

        let calibration = ToolCalibration {
            length,
            unit: unit.to_string(),
            a,
            b,
            pixel_length,
            scale: round_to(length / pixel_length, 4),
        };
        *self = Self::default();
        Ok(calibration)
    }
}
