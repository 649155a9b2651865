//! kvatrack Library
//!
//! Turns a Kinovea annotation file (.kva) into a calibrated, filtered
//! marker trajectory table.
//!
//! The stages run in this order: [`annotation`] parses the file,
//! [`tracks`] aligns marker samples on a shared time base, [`normalize`]
//! maps pixels to the unit square, [`calibration`] scales to real units,
//! [`filter`] smooths each column, and [`export`] writes the report.
//! [`pipeline::extract`] drives them all.

pub mod annotation;
pub mod calibration;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod tracks;

pub use annotation::Annotation;
pub use config::Config;
pub use error::{ExtractError, Result};
pub use export::TrackingReport;
pub use pipeline::{extract, summarize, ExtractOptions, Summary};
pub use prompt::{AcceptDefaults, InputSource, TerminalInput};
