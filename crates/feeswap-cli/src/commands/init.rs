//! `feeswap init` - Write a starter configuration and scenario.

use clap::Args;
use std::path::PathBuf;

use crate::config::FeeswapConfig;
use crate::scenario::SAMPLE_SCENARIO;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let config_path = args.dir.join("feeswap.toml");
    let scenario_path = args.dir.join("scenario.toml");

    for path in [&config_path, &scenario_path] {
        if path.exists() {
            anyhow::bail!("{} already exists", path.display());
        }
    }

    FeeswapConfig::sample().save(&config_path)?;
    std::fs::write(&scenario_path, SAMPLE_SCENARIO)?;
    tracing::info!(path = %config_path.display(), "wrote sample config");

    println!("Initialized feeswap simulation in {}", args.dir.display());
    println!("  Config:   {}", config_path.display());
    println!("  Scenario: {}", scenario_path.display());
    println!();
    println!(
        "Run 'feeswap simulate --config {} --scenario {}' to execute it.",
        config_path.display(),
        scenario_path.display()
    );

    Ok(())
}
