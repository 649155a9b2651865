//! Single-pass scanner over `.kva` annotation lines.
//!
//! The scanner keeps three independent region flags instead of a document
//! tree. Each flag is recomputed on every line from the cues the line carries:
//!
//! ```text
//! flag = (flag || open_cue) && !close_cue
//! ```
//!
//! Regions may overlap (a calibration block can sit inside an open track);
//! every extractor only reads the fields it recognizes, so overlap is harmless.
//!
//! The header values (frame size, framerate) are read by a separate pass,
//! [`read_geometry`], before the main scan.

use std::io::BufRead;

use tracing::{debug, info, warn};

use super::drawings::{CalibrationBuilder, DrawnLine, LineTable, ToolCalibration};
use super::fields::{self, attribute, element_text, parse_number, parse_pair};
use super::time::parse_timestamp;
use super::FrameGeometry;
use crate::error::{ExtractError, Result};
use crate::tracks::{AlignedTable, MarkerTrack, MergeReport, TrackAssembler, TrackSample};

/// Which regions of the annotation the current line is inside.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegionFlags {
    pub track: bool,
    pub line: bool,
    pub calibration: bool,
}

impl RegionFlags {
    /// Apply the open and close cues found in `line`.
    ///
    /// A line carrying both cues of one region opens and closes it at once.
    pub fn update(&mut self, line: &str) {
        self.track = (self.track || line.contains(fields::TRACK_OPEN))
            && !line.contains(fields::TRACK_CLOSE);
        self.line =
            (self.line || line.contains(fields::LINE_OPEN)) && !line.contains(fields::LINE_CLOSE);
        self.calibration = (self.calibration || line.contains(fields::CALIBRATION_OPEN))
            && !line.contains(fields::CALIBRATION_CLOSE);
    }

    pub fn any(&self) -> bool {
        self.track || self.line || self.calibration
    }
}

/// Everything the scan produced.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Marker names in declaration order
    pub markers: Vec<String>,
    pub table: AlignedTable,
    pub merges: Vec<MergeReport>,
    /// Committed line rows, raw pixel coordinates
    pub lines: Vec<DrawnLine>,
    /// Last calibration block, sentinel or not
    pub calibration: Option<ToolCalibration>,
    pub lines_read: usize,
}

/// Stateful line-by-line scanner.
///
/// Owns every piece of transient state (open track, pending line name,
/// half-read segment and calibration) plus the accumulators the scan fills.
#[derive(Debug, Default)]
pub struct Scanner {
    flags: RegionFlags,
    line_no: usize,
    markers: Vec<String>,
    open_track: Option<MarkerTrack>,
    assembler: TrackAssembler,
    line_name: Option<String>,
    segment_start: Option<(f64, f64)>,
    lines: LineTable,
    calibration_fields: CalibrationBuilder,
    calibration: Option<ToolCalibration>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current region flags, after the last line fed.
    pub fn flags(&self) -> RegionFlags {
        self.flags
    }

    /// Process the next line of the annotation.
    ///
    /// # Errors
    ///
    /// A cue whose fields are missing or unreadable is fatal; the scan does
    /// not try to recover mid-file.
    pub fn feed(&mut self, line: &str) -> Result<()> {
        self.line_no += 1;
        self.flags.update(line);

        if line.contains(fields::TRACK_OPEN) {
            self.open_track(line)?;
        }
        if line.contains(fields::TRACK_CLOSE) {
            self.close_track()?;
        }
        if line.contains(fields::LINE_OPEN) {
            let name = attribute(line, "name")
                .ok_or_else(|| self.malformed("line without a name attribute"))?;
            self.line_name = Some(name.to_string());
            self.segment_start = None;
        }
        if line.contains(fields::DRAWINGS_CLOSE) {
            self.lines.finalize();
        }
        if self.flags.calibration {
            self.read_calibration_field(line)?;
        }

        if !self.flags.any() {
            return Ok(());
        }

        if line.contains(fields::TRACK_POINT) {
            self.read_track_point(line)?;
        }
        if line.contains(fields::SEGMENT_START) {
            let start = element_text(line, "Start")
                .and_then(parse_pair)
                .ok_or_else(|| self.malformed("segment start without x;y"))?;
            self.segment_start = Some(start);
        }
        if line.contains(fields::SEGMENT_END) {
            self.read_segment_end(line)?;
        }

        Ok(())
    }

    /// Finish the scan and hand over the accumulated results.
    ///
    /// # Errors
    ///
    /// Fails if a track was opened but its point list never closed, which
    /// means the file is truncated.
    pub fn finish(self) -> Result<ScanOutcome> {
        if let Some(track) = &self.open_track {
            return Err(ExtractError::malformed(
                self.line_no,
                format!("track '{}' is never closed", track.name()),
            ));
        }
        if self.lines.pending_len() > 0 {
            debug!(rows = self.lines.pending_len(), "line rows before finalizing");
        }

        let (table, merges) = self.assembler.finish();
        Ok(ScanOutcome {
            markers: self.markers,
            table,
            merges,
            lines: self.lines.finish(),
            calibration: self.calibration,
            lines_read: self.line_no,
        })
    }

    fn malformed(&self, reason: impl Into<String>) -> ExtractError {
        ExtractError::malformed(self.line_no, reason)
    }

    fn open_track(&mut self, line: &str) -> Result<()> {
        let name = attribute(line, "name")
            .ok_or_else(|| self.malformed("track without a name attribute"))?;
        if self.markers.iter().any(|m| m == name) {
            return Err(ExtractError::DuplicateMarkerName {
                name: name.to_string(),
            });
        }

        if let Some(previous) = self.open_track.take() {
            warn!(
                marker = previous.name(),
                samples = previous.len(),
                "track reopened before its point list closed, discarding buffered samples"
            );
        }

        debug!(marker = name, line = self.line_no, "track opened");
        self.markers.push(name.to_string());
        self.open_track = Some(MarkerTrack::new(name));
        Ok(())
    }

    fn close_track(&mut self) -> Result<()> {
        let track = self
            .open_track
            .take()
            .ok_or_else(|| self.malformed("point list closed without an open track"))?;
        self.assembler.merge(track)?;
        Ok(())
    }

    fn read_track_point(&mut self, line: &str) -> Result<()> {
        let x = attribute(line, "UserX").and_then(parse_number);
        let y = attribute(line, "UserY").and_then(parse_number);
        let time = attribute(line, "UserTime");
        let (x, y, time) = match (x, y, time) {
            (Some(x), Some(y), Some(time)) => (x, y, parse_timestamp(time)?),
            _ => return Err(self.malformed("track point without UserX, UserY and UserTime")),
        };

        let line_no = self.line_no;
        let track = self.open_track.as_mut().ok_or_else(|| {
            ExtractError::malformed(line_no, "track point outside of a named track")
        })?;
        track.push(TrackSample { time, x, y });
        Ok(())
    }

    fn read_segment_end(&mut self, line: &str) -> Result<()> {
        let end = element_text(line, "End")
            .and_then(parse_pair)
            .ok_or_else(|| self.malformed("segment end without x;y"))?;
        let start = self
            .segment_start
            .take()
            .ok_or_else(|| self.malformed("segment end before its start"))?;
        let name = self
            .line_name
            .clone()
            .ok_or_else(|| self.malformed("segment outside of a named line"))?;

        let drawn = DrawnLine::from_endpoints(name, start, end);
        debug!(line = %drawn.name, pixel_length = drawn.pixel_length, "line segment read");
        self.lines.push(drawn);
        Ok(())
    }

    fn read_calibration_field(&mut self, line: &str) -> Result<()> {
        if line.contains(fields::CALIBRATION_LENGTH) {
            let length = element_text(line, "Length")
                .and_then(parse_number)
                .ok_or_else(|| self.malformed("calibration length is not a number"))?;
            self.calibration_fields.set_length(length);
        }
        if line.contains(fields::CALIBRATION_A) {
            let a = element_text(line, "A")
                .and_then(parse_pair)
                .ok_or_else(|| self.malformed("calibration endpoint A without x;y"))?;
            self.calibration_fields.set_a(a);
        }
        if line.contains(fields::CALIBRATION_B) {
            let b = element_text(line, "B")
                .and_then(parse_pair)
                .ok_or_else(|| self.malformed("calibration endpoint B without x;y"))?;
            self.calibration_fields.set_b(b, self.line_no)?;
        }
        if line.contains(fields::CALIBRATION_UNIT) {
            let unit = attribute(line, "Abbreviation")
                .filter(|u| !u.is_empty())
                .or_else(|| element_text(line, "Unit").filter(|u| !u.is_empty()))
                .ok_or_else(|| self.malformed("calibration unit is empty"))?;
            let calibration = self.calibration_fields.finish(unit, self.line_no)?;
            if self.calibration.is_some() {
                debug!("later calibration block replaces the earlier one");
            }
            info!(
                scale = calibration.scale,
                unit = %calibration.unit,
                "calibration block read"
            );
            self.calibration = Some(calibration);
        }
        Ok(())
    }
}

/// Scan a whole annotation stream.
pub fn scan<R: BufRead>(reader: R) -> Result<ScanOutcome> {
    let mut scanner = Scanner::new();
    for line in reader.lines() {
        scanner.feed(&line?)?;
    }
    let outcome = scanner.finish()?;
    info!(
        lines = outcome.lines_read,
        markers = outcome.markers.len(),
        drawn_lines = outcome.lines.len(),
        rows = outcome.table.len(),
        "annotation scanned"
    );
    Ok(outcome)
}

/// Read frame size and capture framerate from the annotation header.
///
/// This is the prior pass that runs before [`scan`]. The first occurrence of
/// each element wins.
pub fn read_geometry<R: BufRead>(reader: R) -> Result<FrameGeometry> {
    let mut size = None;
    let mut framerate = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;

        if size.is_none() && line.contains(fields::IMAGE_SIZE) {
            let (width, height) = element_text(&line, "ImageSize")
                .and_then(parse_image_size)
                .ok_or_else(|| {
                    ExtractError::malformed(line_no, "image size is not width;height")
                })?;
            size = Some((width, height));
        }
        if framerate.is_none() && line.contains(fields::CAPTURE_FRAMERATE) {
            let text = element_text(&line, "CaptureFramerate").unwrap_or_default();
            let value = parse_number(text).filter(|fps| *fps > 0.0).ok_or_else(|| {
                ExtractError::malformed(line_no, "capture framerate is not a positive number")
            })?;
            framerate = Some((value, text.to_string()));
        }
        if size.is_some() && framerate.is_some() {
            break;
        }
    }

    let (width, height) = size.ok_or(ExtractError::MissingHeaderField { field: "ImageSize" })?;
    let (framerate, framerate_text) = framerate.ok_or(ExtractError::MissingHeaderField {
        field: "CaptureFramerate",
    })?;

    Ok(FrameGeometry {
        width,
        height,
        framerate,
        framerate_text,
    })
}

fn parse_image_size(text: &str) -> Option<(u32, u32)> {
    let mut parts = text.split(';');
    let width = parts.next()?.trim().parse::<u32>().ok()?;
    let height = parts.next()?.trim().parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}
