//! Cellfrust CLI - Command-line interface for cellular frustration experiments.

mod commands;
mod config;
mod io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "cellfrust")]
#[command(author, version, about = "Cellfrust - Anomaly detection through cellular frustration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (cellfrust.toml, or a legacy parameters.txt)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new experiment directory
    Init {
        /// Experiment directory (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Run the experiment: untrained, training and trained runs, then
    /// calibration and monitoring of the test set
    Run {
        /// Override the configured seed
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Generate random detector preference lists
    GenLists,

    /// Generate critical windows and the sample queue from labelled training data
    GenCriticals,

    /// Shuffle critical windows between detectors, feature by feature
    ShuffleCriticals,

    /// Compute the ROC curve and AUC of exported responses
    Roc,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run { seed } => commands::run::run(Config::load(config_path)?, seed, cli.verbose),
        Commands::GenLists => commands::gen_lists::run(&Config::load(config_path)?),
        Commands::GenCriticals => commands::gen_criticals::run(&Config::load(config_path)?),
        Commands::ShuffleCriticals => {
            commands::shuffle_criticals::run(&Config::load(config_path)?)
        }
        Commands::Roc => commands::roc::run(&Config::load(config_path)?),
    }
}
