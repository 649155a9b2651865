//! Frame-relative coordinates.
//!
//! The tool stores markers and drawn lines in two different pixel
//! conventions:
//!
//! | Kind   | Origin       | X     | Y    |
//! |--------|--------------|-------|------|
//! | marker | frame center | right | up   |
//! | line   | top-left     | right | down |
//!
//! Both are mapped to one frame: origin bottom-left, X right, Y up, each axis
//! divided by the frame dimension so the visible frame spans `0..1`. Values
//! outside the frame are kept as they are.

use crate::annotation::{DrawnLine, FrameGeometry};
use crate::tracks::{AlignedTable, Axis};

/// Which pixel convention a coordinate comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Marker,
    Line,
}

impl Profile {
    /// Map one raw pixel coordinate into the normalized frame.
    pub fn apply(self, value: f64, axis: Axis, geometry: &FrameGeometry) -> f64 {
        let (width, height) = (geometry.width as f64, geometry.height as f64);
        match (self, axis) {
            (Profile::Marker, Axis::X) => (value + width / 2.0) / width,
            (Profile::Marker, Axis::Y) => (value + height / 2.0) / height,
            (Profile::Line, Axis::X) => value / width,
            (Profile::Line, Axis::Y) => (height - value) / height,
        }
    }
}

fn dimension(axis: Axis, geometry: &FrameGeometry) -> f64 {
    match axis {
        Axis::X => geometry.width as f64,
        Axis::Y => geometry.height as f64,
    }
}

/// Normalize every marker coordinate column in place.
pub fn normalize_markers(table: &mut AlignedTable, geometry: &FrameGeometry) {
    for marker in table.markers_mut() {
        for axis in [Axis::X, Axis::Y] {
            for cell in marker.column_mut(axis).iter_mut().flatten() {
                *cell = Profile::Marker.apply(*cell, axis, geometry);
            }
        }
    }
}

/// Normalize line centers in place. Pixel lengths stay in pixels.
pub fn normalize_lines(lines: &mut [DrawnLine], geometry: &FrameGeometry) {
    for line in lines {
        line.center_x = Profile::Line.apply(line.center_x, Axis::X, geometry);
        line.center_y = Profile::Line.apply(line.center_y, Axis::Y, geometry);
    }
}

/// Undo the division by frame size on marker columns.
///
/// The origin stays bottom-left. After calibration the values are in the
/// calibrated unit.
pub fn denormalize_markers(table: &mut AlignedTable, geometry: &FrameGeometry) {
    for marker in table.markers_mut() {
        for axis in [Axis::X, Axis::Y] {
            let size = dimension(axis, geometry);
            for cell in marker.column_mut(axis).iter_mut().flatten() {
                *cell *= size;
            }
        }
    }
}
