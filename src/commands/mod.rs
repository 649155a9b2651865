//! Command handlers for the kvatrack CLI.
//!
//! Each submodule handles a specific CLI command or command group.
//! The main dispatch logic remains in main.rs.

pub mod config;
pub mod extract;
pub mod inspect;

use anyhow::Result;
use std::path::Path;

use kvatrack::Config;

/// Load the configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
