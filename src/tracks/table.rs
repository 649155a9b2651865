//! The aligned marker table and the track merge.
//!
//! The first track to close seeds the table and fixes its time index. Every
//! later track is left-joined onto that index by rounded time:
//!
//! ```text
//! seed keys:   0   3   7  10  13
//! new track:       3   7  10  13  17  20
//! result:      0   3   7  10  13        <- 17 and 20 are dropped,
//!              ^ new columns are None       row 0 stays with None
//! ```

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{column_name, key_time, time_key, Axis, MarkerTrack};
use crate::error::{ExtractError, Result};

/// The `X` and `Y` columns of one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerColumns {
    pub name: String,
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
}

impl MarkerColumns {
    pub fn column(&self, axis: Axis) -> &[Option<f64>] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    pub fn column_mut(&mut self, axis: Axis) -> &mut Vec<Option<f64>> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    /// Multiply both columns by `factor`, leaving nulls alone.
    pub fn scale(&mut self, factor: f64) {
        for value in self.x.iter_mut().chain(self.y.iter_mut()).flatten() {
            *value *= factor;
        }
    }

    /// Mean position over rows where the value is present.
    pub fn mean_position(&self) -> Option<(f64, f64)> {
        Some((mean(&self.x)?, mean(&self.y)?))
    }
}

fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Outcome of merging one track into the table.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MergeReport {
    pub marker: String,
    /// Whether this track seeded the table
    pub seed: bool,
    /// Samples read for the track
    pub samples: usize,
    /// Table rows that received a value
    pub matched: usize,
    /// Table rows left empty because the track had no sample at that time
    pub unfilled: usize,
    /// Samples discarded because the table has no row at their time
    pub dropped: usize,
}

impl MergeReport {
    pub fn is_lossless(&self) -> bool {
        self.dropped == 0 && self.unfilled == 0
    }
}

/// Result of checking the time index for skipped frames.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuityReport {
    /// Mean time step in seconds
    pub mean_step: f64,
    /// Rows whose step from the previous row deviates from the mean by
    /// more than half of it
    pub jumps: Vec<usize>,
}

impl ContinuityReport {
    pub fn is_continuous(&self) -> bool {
        self.jumps.is_empty()
    }
}

/// Marker coordinates aligned on a shared, rounded time index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedTable {
    keys: Vec<i64>,
    markers: Vec<MarkerColumns>,
}

impl AlignedTable {
    /// Create a table from the first closed track.
    ///
    /// Samples are ordered by rounded time. The seed's rows define the
    /// table's index for good.
    pub fn seed(track: MarkerTrack) -> Self {
        let (name, mut samples) = track.into_parts();
        samples.sort_by_key(|s| time_key(s.time));

        Self {
            keys: samples.iter().map(|s| time_key(s.time)).collect(),
            markers: vec![MarkerColumns {
                name,
                x: samples.iter().map(|s| Some(s.x)).collect(),
                y: samples.iter().map(|s| Some(s.y)).collect(),
            }],
        }
    }

    /// Left-join a track onto the existing index.
    ///
    /// Every existing row survives. Samples whose rounded time has no row are
    /// dropped; when several samples share a rounded time the first wins.
    pub fn join(&mut self, track: MarkerTrack) -> Result<MergeReport> {
        if self.contains_marker(track.name()) {
            return Err(ExtractError::DuplicateMarkerName {
                name: track.name().to_string(),
            });
        }

        let (name, samples) = track.into_parts();
        let mut by_key: HashMap<i64, usize> = HashMap::with_capacity(samples.len());
        for (index, sample) in samples.iter().enumerate() {
            by_key.entry(time_key(sample.time)).or_insert(index);
        }

        let mut used = vec![false; samples.len()];
        let mut x = Vec::with_capacity(self.keys.len());
        let mut y = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            match by_key.get(key) {
                Some(&index) => {
                    used[index] = true;
                    x.push(Some(samples[index].x));
                    y.push(Some(samples[index].y));
                }
                None => {
                    x.push(None);
                    y.push(None);
                }
            }
        }

        let matched = x.iter().filter(|v| v.is_some()).count();
        let report = MergeReport {
            marker: name.clone(),
            seed: false,
            samples: samples.len(),
            matched,
            unfilled: self.keys.len() - matched,
            dropped: used.iter().filter(|u| !**u).count(),
        };

        self.markers.push(MarkerColumns { name, x, y });
        Ok(report)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Rounded join keys, in hundredths of a second.
    pub fn keys(&self) -> &[i64] {
        &self.keys
    }

    /// The `Time` column in seconds.
    pub fn times(&self) -> Vec<f64> {
        self.keys.iter().map(|k| key_time(*k)).collect()
    }

    pub fn markers(&self) -> &[MarkerColumns] {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut [MarkerColumns] {
        &mut self.markers
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn marker_names(&self) -> Vec<&str> {
        self.markers.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn contains_marker(&self, name: &str) -> bool {
        self.markers.iter().any(|m| m.name == name)
    }

    pub fn marker_mut(&mut self, name: &str) -> Option<&mut MarkerColumns> {
        self.markers.iter_mut().find(|m| m.name == name)
    }

    /// Coordinate column names in table order, without `Time`.
    pub fn column_names(&self) -> Vec<String> {
        self.markers
            .iter()
            .flat_map(|m| [column_name(&m.name, Axis::X), column_name(&m.name, Axis::Y)])
            .collect()
    }

    /// Multiply every coordinate column by `factor`.
    pub fn scale_all(&mut self, factor: f64) {
        for marker in &mut self.markers {
            marker.scale(factor);
        }
    }

    /// Look for skipped frames in the time index.
    pub fn check_continuity(&self) -> ContinuityReport {
        let times = self.times();
        let steps: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
        if steps.is_empty() {
            return ContinuityReport {
                mean_step: 0.0,
                jumps: Vec::new(),
            };
        }

        let mean_step = steps.iter().sum::<f64>() / steps.len() as f64;
        let jumps = steps
            .iter()
            .enumerate()
            .filter(|(_, step)| (**step - mean_step).abs() > 0.5 * mean_step)
            .map(|(i, _)| i + 1)
            .collect();

        ContinuityReport { mean_step, jumps }
    }
}

/// Accumulates closed tracks into one [`AlignedTable`] during a scan.
#[derive(Debug, Default)]
pub struct TrackAssembler {
    table: Option<AlignedTable>,
    reports: Vec<MergeReport>,
}

impl TrackAssembler {
    /// Merge a closed track; the first one seeds the table.
    pub fn merge(&mut self, track: MarkerTrack) -> Result<MergeReport> {
        let report = match self.table.as_mut() {
            None => {
                let samples = track.len();
                let marker = track.name().to_string();
                let table = AlignedTable::seed(track);
                let rows = table.len();
                self.table = Some(table);
                MergeReport {
                    marker,
                    seed: true,
                    samples,
                    matched: rows,
                    unfilled: 0,
                    dropped: 0,
                }
            }
            Some(table) => table.join(track)?,
        };

        if report.dropped > 0 || report.unfilled > 0 {
            warn!(
                marker = %report.marker,
                dropped = report.dropped,
                unfilled = report.unfilled,
                "track does not line up with the seed track's frames"
            );
        } else {
            debug!(marker = %report.marker, rows = report.matched, "merged track");
        }

        self.reports.push(report.clone());
        Ok(report)
    }

    pub fn finish(self) -> (AlignedTable, Vec<MergeReport>) {
        (self.table.unwrap_or_default(), self.reports)
    }
}
