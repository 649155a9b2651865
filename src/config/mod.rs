//! Configuration management for kvatrack
//!
//! Every question asked during extraction has a default, read from
//! `~/.config/kvatrack/config.toml`. All keys are optional:
//!
//! ```toml
//! [filter]
//! cutoff_hz = 5.0
//!
//! [calibration]
//! pair_line_length = 9.5
//! pair_line_unit = "mm"
//! single_line_length = 10.0
//! single_line_unit = "mm"
//!
//! [export]
//! canonical_names = ["D1", "P1", "D2", "P2", "D3", "P3"]
//! output_suffix = "_Tracking"
//! ```

mod io;
mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

impl Config {
    /// Get the config file path (~/.config/kvatrack/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Get the config directory path (~/.config/kvatrack)
    pub fn config_dir() -> Result<PathBuf> {
        io::config_dir()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load()
    }

    /// Load configuration from an explicit file; a missing file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Parse configuration text
    pub fn from_toml(contents: &str) -> Result<Self> {
        io::parse(contents)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
