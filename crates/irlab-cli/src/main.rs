//! irlab CLI - batch retrieval runs over an experiment config.
//!
//! # Usage
//!
//! ```bash
//! # Write TREC run files for every track x model x operator
//! irlab search
//! irlab search --config exp/irlab.toml --threads 8 --hits 100
//! irlab search --models DPH,PL2c1.0 --json
//!
//! # Write verbose per-term breakdowns instead
//! irlab explain --hits 20
//!
//! # Show help
//! irlab --help
//! ```

mod config;
mod output;
mod search;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use irlab_core::search::OutputMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// irlab batch search CLI.
///
/// Scores a collection with several ranking models and writes one TREC run
/// file per (track, model, operator, query part).
#[derive(Parser)]
#[command(name = "irlab", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Experiment config (default: $IRLAB_CONFIG, then ./irlab.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Write TREC run files
    Search(RunArgs),
    /// Write verbose per-term score breakdowns
    Explain(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Worker threads (overrides the config)
    #[arg(long)]
    threads: Option<usize>,

    /// Hits per query (overrides the config)
    #[arg(long)]
    hits: Option<usize>,

    /// Comma-separated model names (overrides the config)
    #[arg(long, value_delimiter = ',')]
    models: Vec<String>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let (args, mode) = match cli.command {
        Command::Search(args) => (args, OutputMode::Run),
        Command::Explain(args) => (args, OutputMode::Verbose),
    };

    let mut experiment = config::load_config(cli.config.as_ref())?;
    if let Some(threads) = args.threads {
        experiment.num_threads = threads;
    }
    if let Some(hits) = args.hits {
        experiment.num_hits = hits;
    }
    if !args.models.is_empty() {
        experiment.models = args.models;
    }
    experiment.validate()?;

    let show_progress = !args.no_progress && !cli.json;
    let report = search::execute(experiment, mode, show_progress).await?;

    let output = if cli.json {
        output::format_json(&report)
    } else {
        output::format_human(&report, mode)
    };
    println!("{}", output);

    Ok(())
}
