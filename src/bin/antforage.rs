//! antforage CLI - Foraging simulation with learning ants
//!
//! This CLI provides a unified interface for:
//! - Running populations of random, scent-following and learning agents
//! - Dumping scent fields for plotting
//! - Inspecting and converting learned value files
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "antforage")]
#[command(version, about = "Foraging ants that learn to follow the scent of food", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation for a number of ticks
    Run(Box<antforage::cli::commands::run::RunArgs>),

    /// Write an environment's scent field as CSV
    Scent(antforage::cli::commands::scent::ScentArgs),

    /// Inspect, convert and reset learned value files
    Values(antforage::cli::commands::values::ValuesArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => antforage::cli::commands::run::execute(*args),
        Commands::Scent(args) => antforage::cli::commands::scent::execute(args),
        Commands::Values(args) => antforage::cli::commands::values::execute(args),
    }
}
