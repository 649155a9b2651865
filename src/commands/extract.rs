//! Extract command handler

use anyhow::{Context, Result};
use std::path::PathBuf;

use kvatrack::calibration::{parse_length_answer, split_override, CalibrationAnswers, Length};
use kvatrack::export::default_output_path;
use kvatrack::{
    extract, AcceptDefaults, Annotation, Config, ExtractOptions, InputSource, TerminalInput,
};

use super::load_config;

/// Command-line arguments of `kvatrack extract`.
pub struct ExtractArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub cutoff: Option<f64>,
    pub line_lengths: Vec<String>,
    pub pairs: Vec<String>,
    pub order: Option<String>,
    pub yes: bool,
    pub non_interactive: bool,
    pub config: Option<PathBuf>,
}

/// Turn the command-line answers into extraction options.
///
/// Overrides are checked here, before the file is read; a malformed one
/// fails the run instead of being asked again.
pub fn build_options(args: &ExtractArgs, config: &Config) -> Result<ExtractOptions> {
    let settings = config.calibration_settings();
    let mut calibration = CalibrationAnswers {
        confirm_tool_scale: args.yes,
        ..Default::default()
    };

    for text in &args.line_lengths {
        let (line, value) = split_override(text)?;
        if value.is_empty() {
            anyhow::bail!("--line-length {} has no length", text);
        }
        let length: Length = parse_length_answer(value, &settings.single_line)
            .with_context(|| format!("Invalid --line-length {}", text))?;
        calibration.line_lengths.insert(line.to_string(), length);
    }
    for text in &args.pairs {
        let (line, value) = split_override(text)?;
        calibration
            .pairs
            .insert(line.to_string(), value.to_string());
    }

    Ok(ExtractOptions {
        cutoff: args.cutoff,
        calibration,
        column_order: args.order.clone(),
    })
}

/// Where the report goes.
pub fn output_path(args: &ExtractArgs, config: &Config) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.file, &config.export.output_suffix))
}

/// Extract a report and write it.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: ExtractArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let options = build_options(&args, &config)?;
    let output = output_path(&args, &config);

    let annotation = Annotation::load(&args.file)
        .with_context(|| format!("Failed to read annotation: {}", args.file.display()))?;

    let mut input: Box<dyn InputSource> = if args.non_interactive {
        Box::new(AcceptDefaults)
    } else {
        Box::new(TerminalInput::stdio())
    };

    let report = extract(annotation, &config, &options, input.as_mut())
        .with_context(|| format!("Failed to extract {}", args.file.display()))?;
    report
        .save(&output)
        .with_context(|| format!("Failed to write report: {}", output.display()))?;

    println!("Report written to {}", output.display());
    Ok(())
}
