//! # Spectra - FFT Engine Command Line
//!
//! Front-end for the `spectra-core` transform engine. It builds or loads a
//! time-domain signal, runs it through one of the three back-ends and
//! prints the spectrum, or cross-checks every back-end against the direct
//! DFT.
//!
//! ## Configuration
//! Settings come from an optional JSON file (`--config`) and are then
//! overridden by individual command line flags.

mod commands;
mod settings;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{PartitionArgs, RunArgs, VerifyArgs};
use spectra_core::Backend;

#[derive(Parser)]
#[command(name = "spectra")]
#[command(about = "Radix-2 FFT engine with sequential, task-parallel and distributed back-ends")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Back-end to run (sequential, task-parallel, distributed)
    #[arg(short = 'b', long, global = true)]
    pub backend: Option<Backend>,

    /// Largest frame the task-parallel back-end transforms sequentially
    #[arg(long, global = true)]
    pub threshold: Option<usize>,

    /// Threads in a dedicated task-parallel pool
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Number of ranks in the distributed group
    #[arg(short = 'p', long, global = true)]
    pub workers: Option<usize>,

    /// Collective timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Verbose logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transform a signal and print its spectrum
    Run(RunArgs),
    /// Compare every back-end against the direct DFT
    Verify(VerifyArgs),
    /// Show which frequency bins each distributed rank owns
    Partition(PartitionArgs),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = settings::load(&cli)?;
    tracing::debug!(?config, "effective configuration");

    match &cli.command {
        Commands::Run(args) => commands::run(args, &config),
        Commands::Verify(args) => commands::verify(args, &config),
        Commands::Partition(args) => commands::partition(args, &config),
    }
}
