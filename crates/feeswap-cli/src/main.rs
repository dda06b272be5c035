//! feeswap CLI - local simulation of the swap settlement ledger.
//!
//! Subcommands: init, simulate, quote.

mod commands;
mod config;
mod scenario;
mod simulation;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::{FeeswapConfig, LoggingConfig};

/// Fee-collecting swap routing, simulated locally.
#[derive(Parser, Debug)]
#[command(name = "feeswap", version, about, long_about = None)]
struct Cli {
    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter config and scenario.
    Init(commands::init::InitArgs),
    /// Run a scenario against an in-memory ledger deployment.
    Simulate(commands::simulate::SimulateArgs),
    /// Quote a swap through the configured pools.
    Quote(commands::quote::QuoteArgs),
}

fn init_logging(logging: &LoggingConfig, override_level: Option<&str>) {
    let level = override_level.unwrap_or(logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let override_level = cli.log_level.as_deref();

    match &cli.command {
        Commands::Init(args) => {
            init_logging(&LoggingConfig::default(), override_level);
            commands::init::run(args)
        }
        Commands::Simulate(args) => {
            let config = FeeswapConfig::load(&args.config)?;
            init_logging(&config.logging, override_level);
            commands::simulate::run(args, &config)
        }
        Commands::Quote(args) => {
            let config = FeeswapConfig::load(&args.config)?;
            init_logging(&config.logging, override_level);
            commands::quote::run(args, &config)
        }
    }
}
