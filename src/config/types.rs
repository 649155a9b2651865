//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationSettings, Length};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.filter.cutoff_hz.is_finite() && self.filter.cutoff_hz > 0.0) {
            return Err(format!(
                "filter.cutoff_hz must be a positive number, got {}",
                self.filter.cutoff_hz
            ));
        }

        let cal = &self.calibration;
        for (key, value) in [
            ("calibration.pair_line_length", cal.pair_line_length),
            ("calibration.single_line_length", cal.single_line_length),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be a positive number, got {}", key, value));
            }
        }
        for (key, unit) in [
            ("calibration.pair_line_unit", &cal.pair_line_unit),
            ("calibration.single_line_unit", &cal.single_line_unit),
        ] {
            if unit.trim().is_empty() || unit.contains(char::is_whitespace) {
                return Err(format!("{} must be a single word, got '{}'", key, unit));
            }
        }

        let names = &self.export.canonical_names;
        if names.is_empty() {
            return Err("export.canonical_names must not be empty".to_string());
        }
        for (index, name) in names.iter().enumerate() {
            if name.trim().is_empty() || name.contains(',') {
                return Err(format!(
                    "export.canonical_names entry '{}' must be non-empty and without commas",
                    name
                ));
            }
            if names[..index].contains(name) {
                return Err(format!("export.canonical_names repeats '{}'", name));
            }
        }
        Ok(())
    }

    /// Default true lengths for manual calibration.
    pub fn calibration_settings(&self) -> CalibrationSettings {
        let cal = &self.calibration;
        CalibrationSettings {
            pair_line: Length::new(cal.pair_line_length, cal.pair_line_unit.clone()),
            single_line: Length::new(cal.single_line_length, cal.single_line_unit.clone()),
        }
    }
}

/// Low-pass filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Cutoff offered when prompting, in Hz
    #[serde(default = "default_cutoff_hz")]
    pub cutoff_hz: f64,
}

pub fn default_cutoff_hz() -> f64 {
    5.0
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: default_cutoff_hz(),
        }
    }
}

/// Manual calibration defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// True length of each line when there is one line per marker pair.
    /// 9.5 mm is a 3/8" pushpin head.
    #[serde(default = "default_pair_line_length")]
    pub pair_line_length: f64,
    #[serde(default = "default_unit")]
    pub pair_line_unit: String,
    /// True length of a single line calibrating every marker.
    /// 10 mm is the overall diameter of a reflective marker.
    #[serde(default = "default_single_line_length")]
    pub single_line_length: f64,
    #[serde(default = "default_unit")]
    pub single_line_unit: String,
}

pub fn default_pair_line_length() -> f64 {
    9.5
}

pub fn default_single_line_length() -> f64 {
    10.0
}

pub fn default_unit() -> String {
    "mm".to_string()
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            pair_line_length: default_pair_line_length(),
            pair_line_unit: default_unit(),
            single_line_length: default_single_line_length(),
            single_line_unit: default_unit(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Short marker names, in the order the report lists them
    #[serde(default = "default_canonical_names")]
    pub canonical_names: Vec<String>,
    /// Appended to the input file stem to name the report
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

pub fn default_canonical_names() -> Vec<String> {
    ["D1", "P1", "D2", "P2", "D3", "P3"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_output_suffix() -> String {
    "_Tracking".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            canonical_names: default_canonical_names(),
            output_suffix: default_output_suffix(),
        }
    }
}
