//! `stackwright generate` - Write a new template.

use std::path::PathBuf;

use crate::runtime::{self, RunOptions};

pub async fn run(
    options: &RunOptions,
    samples: &[PathBuf],
    instructions: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = runtime::load_config(options)?;
    let instructions = runtime::read_instructions(instructions)?;
    let samples = runtime::load_samples(samples)?;

    runtime::prepare_corpus(&config, options).await;
    let engine = runtime::build_engine(&config)?;

    let template = engine.generate(&instructions, samples.as_deref()).await?;

    let output = output.unwrap_or_else(|| runtime::default_output_name(chrono::Local::now()));
    runtime::write_output(&output, &template)?;
    if output.as_os_str() != "-" {
        eprintln!("✅ Template written to {}", output.display());
    }

    Ok(())
}
