//! Reading Kinovea `.kva` annotation files.
//!
//! An annotation is read in two passes over the same text:
//!
//! 1. [`scanner::read_geometry`] pulls the frame size and framerate from the
//!    header.
//! 2. [`scanner::scan`] walks every line once, collecting marker tracks into
//!    an aligned table, drawn reference lines, and the tool's calibration.
//!
//! # Example
//!
//! ```no_run
//! use kvatrack::annotation::Annotation;
//!
//! let annotation = Annotation::load("trial_03.kva")?;
//! println!(
//!     "{} markers over {} frames at {} fps",
//!     annotation.markers.len(),
//!     annotation.table.len(),
//!     annotation.geometry.framerate_text
//! );
//! # Ok::<(), kvatrack::ExtractError>(())
//! ```
//!
//! # Structure
//!
//! - `time` - `UserTime` parsing
//! - `fields` - Line cues and field extraction
//! - `drawings` - Drawn lines and the calibration block
//! - `scanner` - The region-flag scanner and header pass

mod drawings;
pub mod fields;
pub mod scanner;
mod time;

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek, SeekFrom};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::tracks::{AlignedTable, MergeReport};

pub(crate) use drawings::round_to;
pub use drawings::{DrawnLine, LineTable, ToolCalibration};
pub use scanner::{read_geometry, scan, RegionFlags, ScanOutcome, Scanner};
pub use time::parse_timestamp;

/// Frame size and framerate from the annotation header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameGeometry {
    /// Pixels
    pub width: u32,
    /// Pixels
    pub height: u32,
    /// Frames per second
    pub framerate: f64,
    /// Framerate exactly as written in the file, echoed into the report
    pub framerate_text: String,
}

impl FrameGeometry {
    /// Highest frequency the sampling rate can represent.
    pub fn nyquist(&self) -> f64 {
        self.framerate / 2.0
    }
}

/// A fully scanned annotation.
#[derive(Debug)]
pub struct Annotation {
    /// File name the annotation was read from, used in the report title
    pub source_name: String,
    pub geometry: FrameGeometry,
    /// Marker names in declaration order
    pub markers: Vec<String>,
    pub table: AlignedTable,
    pub merges: Vec<MergeReport>,
    pub lines: Vec<DrawnLine>,
    /// Last calibration block in the file, sentinel included
    pub calibration: Option<ToolCalibration>,
}

impl Annotation {
    /// Read and scan an annotation file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(path = %path.display(), "reading annotation");
        let file = File::open(path)?;
        Self::parse_reader(source_name, BufReader::new(file))
    }

    /// Scan an annotation held in memory.
    pub fn parse_str(source_name: impl Into<String>, content: &str) -> Result<Self> {
        Self::parse_reader(source_name, Cursor::new(content.as_bytes()))
    }

    /// Scan an annotation from any seekable reader.
    ///
    /// The reader is rewound between the header pass and the main scan.
    pub fn parse_reader<R: BufRead + Seek>(
        source_name: impl Into<String>,
        mut reader: R,
    ) -> Result<Self> {
        let geometry = read_geometry(&mut reader)?;
        reader.seek(SeekFrom::Start(0))?;
        let outcome = scan(reader)?;

        Ok(Self::from_parts(source_name, geometry, outcome))
    }

    pub fn from_parts(
        source_name: impl Into<String>,
        geometry: FrameGeometry,
        outcome: ScanOutcome,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            geometry,
            markers: outcome.markers,
            table: outcome.table,
            merges: outcome.merges,
            lines: outcome.lines,
            calibration: outcome.calibration,
        }
    }

    /// The tool calibration, unless it is the uncalibrated placeholder.
    pub fn tool_calibration(&self) -> Option<&ToolCalibration> {
        self.calibration.as_ref().filter(|c| !c.is_sentinel())
    }
}
