//! `feeswap simulate` - Run a scenario against an in-memory deployment.

use clap::Args;
use feeswap_ledger::IToken;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::FeeswapConfig;
use crate::scenario::Scenario;
use crate::simulation::{Simulation, StepOutcome, StepReport};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Path to the config file.
    #[arg(short, long, default_value = "feeswap.toml")]
    pub config: PathBuf,

    /// Path to the scenario file.
    #[arg(short, long, default_value = "scenario.toml")]
    pub scenario: PathBuf,

    /// Print one JSON object per step, then the final status.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &SimulateArgs, config: &FeeswapConfig) -> anyhow::Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let sim = Simulation::from_config(config)?;

    let mut failed = 0usize;
    for (i, step) in scenario.steps.iter().enumerate() {
        let report = sim.run_step(i + 1, step);
        if report.error.is_some() {
            failed += 1;
        }
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_report(&report)?;
        }
    }

    let status = sim.ledger().status();
    tracing::info!(
        steps = scenario.steps.len(),
        failed,
        swap_count = status.swap_count,
        "scenario finished"
    );

    if args.json {
        println!("{}", serde_json::to_string(&status)?);
        return Ok(());
    }

    println!();
    println!("Ledger {}", status.address);
    println!(
        "  Router:         {} ({}/{} updates)",
        status.router, status.router_updates, status.router_update_cap
    );
    println!("  Paused:         {}", status.paused);
    println!("  Swaps:          {}", status.swap_count);
    println!("  Fee collector:  {}", status.config.fee_collector);
    let tokens: BTreeSet<_> = config
        .pools
        .iter()
        .flat_map(|p| [p.token_a, p.token_b])
        .collect();
    for token in tokens {
        let collected = sim.chain().balance_of(&token, &status.config.fee_collector);
        if collected > 0 {
            println!("    collected {} of {}", collected, token);
        }
    }
    for snapshot in &status.snapshots {
        println!(
            "  Epoch {}: height {}, swaps {}, sealed {}",
            snapshot.epoch_id, snapshot.height, snapshot.swap_count, snapshot.sealed_at
        );
    }
    println!("  Steps failed:   {}/{}", failed, scenario.steps.len());
    Ok(())
}

fn print_report(report: &StepReport) -> anyhow::Result<()> {
    match (&report.outcome, &report.error) {
        (Some(outcome), _) => println!("[{}] {}: {}", report.step, report.op, describe(outcome)),
        (None, Some(error)) => println!("[{}] {}: FAILED {}", report.step, report.op, error),
        (None, None) => println!("[{}] {}", report.step, report.op),
    }
    for event in &report.events {
        println!("      {} {}", event.kind(), serde_json::to_string(event)?);
    }
    Ok(())
}

fn describe(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Swap(o) => format!("out {} fee {}", o.amount_out, o.fee),
        StepOutcome::Batch(o) => format!("total out {} total fee {}", o.total_out, o.total_fee),
        StepOutcome::Quote { amount_out } => format!("quote {}", amount_out),
        StepOutcome::RouterUpdated { ordinal } => format!("router update #{}", ordinal),
        StepOutcome::Sealed { replaced: None } => "sealed".to_string(),
        StepOutcome::Sealed { replaced: Some(old) } => {
            format!("sealed, replaced snapshot at height {}", old.height)
        }
        StepOutcome::PauseSet { paused } => format!("paused = {}", paused),
        StepOutcome::Advanced { height, timestamp } => {
            format!("height {} timestamp {}", height, timestamp)
        }
    }
}
