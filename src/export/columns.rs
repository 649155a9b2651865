//! Renaming markers to the canonical short scheme.
//!
//! Downstream analysis expects markers named and ordered `D1, P1, D2, P2, ...`
//! (distal and proximal marker of each pair). The mapping assigns one short
//! name per detected marker and sorts the table into canonical order.

use serde::Serialize;

use crate::error::{ExtractError, Result};
use crate::tracks::AlignedTable;

/// Assignment of short names to the detected markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMapping {
    /// Marker names in table order before renaming
    pub original: Vec<String>,
    /// Short name for each entry of `original`
    pub short: Vec<String>,
    /// Canonical order the table ends up in
    pub canonical: Vec<String>,
}

impl ColumnMapping {
    /// Rename in declaration order: first marker gets the first canonical name.
    pub fn in_order(markers: &[String], canonical: &[String]) -> Result<Self> {
        if markers.len() > canonical.len() {
            return Err(ExtractError::ColumnCountMismatch {
                expected: markers.len(),
                found: canonical.len(),
            });
        }
        Ok(Self {
            original: markers.to_vec(),
            short: canonical[..markers.len()].to_vec(),
            canonical: canonical[..markers.len()].to_vec(),
        })
    }

    /// Parse a comma-separated list of short names, one per marker in table
    /// order. An empty answer renames in declaration order.
    ///
    /// # Errors
    ///
    /// [`ExtractError::ColumnCountMismatch`] when the list length differs from
    /// the marker count; [`ExtractError::InvalidColumnMapping`] when a name is
    /// not among the first canonical names or repeats.
    pub fn parse(answer: &str, markers: &[String], canonical: &[String]) -> Result<Self> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Self::in_order(markers, canonical);
        }

        let short: Vec<String> = answer.split(',').map(|s| s.trim().to_string()).collect();
        if short.len() != markers.len() {
            return Err(ExtractError::ColumnCountMismatch {
                expected: markers.len(),
                found: short.len(),
            });
        }
        if markers.len() > canonical.len() {
            return Err(ExtractError::ColumnCountMismatch {
                expected: markers.len(),
                found: canonical.len(),
            });
        }

        let allowed = &canonical[..markers.len()];
        for (index, name) in short.iter().enumerate() {
            if !allowed.contains(name) {
                return Err(ExtractError::InvalidColumnMapping(format!(
                    "'{}' is not one of {}",
                    name,
                    allowed.join(", ")
                )));
            }
            if short[..index].contains(name) {
                return Err(ExtractError::InvalidColumnMapping(format!(
                    "'{}' is assigned twice",
                    name
                )));
            }
        }

        Ok(Self {
            original: markers.to_vec(),
            short,
            canonical: allowed.to_vec(),
        })
    }

    /// Whether applying the mapping changes the column order.
    pub fn reorders(&self) -> bool {
        self.short != self.canonical
    }

    /// Rename the table's markers and sort them into canonical order.
    pub fn apply(&self, table: &mut AlignedTable) {
        let markers = table.markers_mut();
        for marker in markers.iter_mut() {
            if let Some(index) = self.original.iter().position(|n| *n == marker.name) {
                marker.name = self.short[index].clone();
            }
        }
        markers.sort_by_key(|marker| {
            self.canonical
                .iter()
                .position(|n| *n == marker.name)
                .unwrap_or(usize::MAX)
        });
    }
}
