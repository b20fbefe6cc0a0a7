//! Stackwright CLI: the main entry point.
//!
//! Commands:
//! - `generate`  - Write a new template from instructions (and samples)
//! - `transform` - Rewrite an existing template in place
//! - `refresh`   - Download the CloudFormation schema corpus
//! - `models`    - List model aliases

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod runtime;

#[derive(Parser, Debug)]
#[command(
    name = "stackwright",
    about = "Stackwright: CloudFormation templates from plain instructions",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Model alias or id (see `stackwright models`)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip the automatic schema corpus refresh
    #[arg(long, global = true)]
    no_refresh: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new template
    Generate {
        /// Sample template whose style the output should follow (repeatable)
        #[arg(short, long = "sample", value_name = "FILE")]
        samples: Vec<PathBuf>,

        /// What the template should contain; read from stdin when omitted
        #[arg(short, long)]
        instructions: Option<String>,

        /// Where to write the template; `-` for stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rewrite an existing template in place
    Transform {
        /// Template to rewrite
        file: PathBuf,

        /// What to change; read from stdin when omitted
        #[arg(short, long)]
        instructions: Option<String>,
    },

    /// Refresh the schema corpus
    Refresh {
        /// Download even if the corpus is current
        #[arg(short, long)]
        force: bool,
    },

    /// List model aliases
    Models,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so templates can be piped from stdout
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = runtime::RunOptions {
        model: cli.model,
        no_refresh: cli.no_refresh,
    };

    match cli.command {
        Commands::Generate {
            samples,
            instructions,
            output,
        } => commands::generate::run(&options, &samples, instructions, output).await?,
        Commands::Transform { file, instructions } => {
            commands::transform::run(&options, &file, instructions).await?
        }
        Commands::Refresh { force } => commands::refresh::run(force).await?,
        Commands::Models => commands::models::run()?,
    }

    Ok(())
}
