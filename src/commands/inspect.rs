//! Inspect command handler

use anyhow::{Context, Result};
use std::path::Path;

use kvatrack::{summarize, Annotation};

/// Describe a .kva file on stdout.
#[cfg(not(tarpaulin_include))]
pub fn handle(file: &Path, json: bool) -> Result<()> {
    let annotation = Annotation::load(file)
        .with_context(|| format!("Failed to read annotation: {}", file.display()))?;
    let summary = summarize(annotation);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.to_text());
    }
    Ok(())
}
