//! CLI definitions for kvatrack
//!
//! This module contains the clap CLI structure definitions, separated from
//! main.rs so the command handlers can share them.

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Build clap styles for help output.
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "kvatrack")]
#[command(about = "Extract calibrated, filtered marker trajectories from Kinovea .kva files")]
#[command(
    long_about = "kvatrack - Extract marker trajectories from Kinovea annotation files.

Reads the trajectories tracked in a Kinovea .kva file, calibrates them to real
units (Kinovea's calibration tool, or lines drawn over objects of known size),
smooths them with a zero-lag Butterworth low-pass filter and writes a tracking
report next to the input.

QUICK START:
    kvatrack extract trial_03.kva          Extract, answering prompts
    kvatrack extract trial_03.kva --yes    Accept every default
    kvatrack inspect trial_03.kva          Describe the file without writing

Defaults for every prompt live in ~/.config/kvatrack/config.toml."
)]
#[command(version)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a tracking report from a .kva file
    #[command(long_about = "Extract a calibrated, filtered tracking report from a .kva file.

Calibration is chosen from the file's contents:
    tool            Kinovea's calibration tool is set; its scale is used
    line per pair   one drawn line for every two markers
    single line     one drawn line calibrates every marker

Every question has a default. Press Enter to accept it, or answer ahead of
time with the options below. The report is only written when every stage
succeeds.

EXAMPLES:
    kvatrack extract trial.kva
    kvatrack extract trial.kva --cutoff 6 --order D1,P1
    kvatrack extract trial.kva --line-length \"Line_1=12.7 mm\" --pair Line_1=Dist_1,Prox_1
    kvatrack extract trial.kva --non-interactive --output out.csv")]
    Extract {
        /// Path to the .kva file
        #[arg(help = "Path to the .kva file")]
        file: PathBuf,
        /// Report path (default: <input stem>_Tracking.csv next to the input)
        #[arg(long, short, help = "Report path")]
        output: Option<PathBuf>,
        /// Low-pass cutoff frequency in Hz
        #[arg(long, help = "Low-pass cutoff frequency in Hz")]
        cutoff: Option<f64>,
        /// True length of a calibration line, as LINE=VALUE UNIT
        #[arg(
            long = "line-length",
            value_name = "LINE=LENGTH",
            help = "True length of a line, e.g. \"Line_1=9.5 mm\" (repeatable)"
        )]
        line_lengths: Vec<String>,
        /// Markers calibrated by a line, as LINE=A,B
        #[arg(
            long = "pair",
            value_name = "LINE=A,B",
            help = "Markers a line calibrates, e.g. Line_1=Dist_1,Prox_1 (repeatable)"
        )]
        pairs: Vec<String>,
        /// Short names for the markers in file order
        #[arg(long, value_name = "NAMES", help = "Short marker names in file order, e.g. P1,D1")]
        order: Option<String>,
        /// Apply a tool calibration to more than two markers without asking
        #[arg(long, short, help = "Confirm applying tool calibration to all markers")]
        yes: bool,
        /// Never prompt; take the default for every question
        #[arg(long, help = "Never prompt; take every default")]
        non_interactive: bool,
        /// Read configuration from this file
        #[arg(long, value_name = "PATH", help = "Config file to use")]
        config: Option<PathBuf>,
    },

    /// Describe a .kva file without writing anything
    #[command(long_about = "Describe a .kva file without writing anything.

Shows frame geometry, marker tracks with their mean normalized positions,
drawn lines, tool calibration, and the calibration mode extract would use.

EXAMPLES:
    kvatrack inspect trial.kva
    kvatrack inspect trial.kva --json")]
    Inspect {
        /// Path to the .kva file
        #[arg(help = "Path to the .kva file")]
        file: PathBuf,
        /// Print JSON instead of text
        #[arg(long, help = "Print JSON instead of text")]
        json: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show {
        /// Read configuration from this file
        #[arg(long, value_name = "PATH", help = "Config file to use")]
        config: Option<PathBuf>,
    },
    /// Print the configuration file path
    Path,
}
