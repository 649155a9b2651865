//! Marker tracks and the aligned marker table.
//!
//! A [`MarkerTrack`] is the per-frame trajectory of one tracked marker as it
//! is read from the annotation. When the track closes it is merged into the
//! [`AlignedTable`], which keys every row by time rounded to hundredths of a
//! second.
//!
//! # Structure
//!
//! - `table` - The aligned table, the left join, and table-wide checks

mod table;

pub use table::{AlignedTable, ContinuityReport, MarkerColumns, MergeReport, TrackAssembler};

/// Coordinate axis of a marker column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Column name suffix, as in `Dist_1_X`.
    pub fn suffix(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
        }
    }
}

/// Column name for one axis of a marker.
pub fn column_name(marker: &str, axis: Axis) -> String {
    format!("{}_{}", marker, axis.suffix())
}

/// Join key for a timestamp: time in whole hundredths of a second.
///
/// Rounding absorbs the jitter in the tool's per-frame timestamps so that
/// tracks of the same video line up.
pub fn time_key(seconds: f64) -> i64 {
    (seconds * 100.0).round() as i64
}

/// Timestamp represented by a join key.
pub fn key_time(key: i64) -> f64 {
    key as f64 / 100.0
}

/// One tracked position in raw tool coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    /// Seconds
    pub time: f64,
    /// Pixels, origin at frame center, X right
    pub x: f64,
    /// Pixels, origin at frame center, Y up
    pub y: f64,
}

/// A marker's samples, in the order they were read.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerTrack {
    name: String,
    samples: Vec<TrackSample>,
}

impl MarkerTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
        }
    }

    pub fn with_samples(name: impl Into<String>, samples: Vec<TrackSample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[TrackSample] {
        &self.samples
    }

    pub fn push(&mut self, sample: TrackSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, Vec<TrackSample>) {
        (self.name, self.samples)
    }
}
