//! `stackwright transform` - Rewrite a template in place.

use std::path::Path;

use crate::runtime::{self, RunOptions};

pub async fn run(
    options: &RunOptions,
    file: &Path,
    instructions: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let config = runtime::load_config(options)?;
    let instructions = runtime::read_instructions(instructions)?;

    runtime::prepare_corpus(&config, options).await;
    let engine = runtime::build_engine(&config)?;

    let template = engine.transform(&instructions, &source).await?;
    runtime::write_output(file, &template)?;
    eprintln!("✅ Updated {}", file.display());

    Ok(())
}
