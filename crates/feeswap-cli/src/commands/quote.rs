//! `feeswap quote` - Quote a swap against the configured pools.

use clap::Args;
use feeswap_core::{Address, TokenAmount};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::FeeswapConfig;
use crate::simulation::Simulation;

#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Path to the config file.
    #[arg(short, long, default_value = "feeswap.toml")]
    pub config: PathBuf,

    /// Input token address.
    #[arg(long)]
    pub token_in: Address,

    /// Output token address.
    #[arg(long)]
    pub token_out: Address,

    /// Gross input amount in base units.
    #[arg(short, long)]
    pub amount: TokenAmount,

    /// Quote what the router receives after the protocol fee.
    #[arg(long)]
    pub net: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct QuoteResult {
    token_in: Address,
    token_out: Address,
    amount_in: TokenAmount,
    fee: TokenAmount,
    routed_in: TokenAmount,
    amount_out: TokenAmount,
}

pub fn run(args: &QuoteArgs, config: &FeeswapConfig) -> anyhow::Result<()> {
    let result = quote(args, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Quote {} -> {}", result.token_in, result.token_out);
    println!("  Amount in:  {}", result.amount_in);
    if args.net {
        println!("  Fee:        {}", result.fee);
        println!("  Routed in:  {}", result.routed_in);
    }
    if result.amount_out == 0 {
        println!("  Amount out: 0 (no route)");
    } else {
        println!("  Amount out: {}", result.amount_out);
    }
    Ok(())
}

fn quote(args: &QuoteArgs, config: &FeeswapConfig) -> anyhow::Result<QuoteResult> {
    let sim = Simulation::from_config(config)?;
    let ledger = sim.ledger();

    let split = ledger.fee_split(args.amount);
    let (fee, routed_in, amount_out) = if args.net {
        (
            split.fee,
            split.net,
            ledger.quote_exact_in_net(&args.token_in, &args.token_out, args.amount),
        )
    } else {
        (
            0,
            args.amount,
            ledger.quote_exact_in(&args.token_in, &args.token_out, args.amount),
        )
    };

    Ok(QuoteResult {
        token_in: args.token_in,
        token_out: args.token_out,
        amount_in: args.amount,
        fee,
        routed_in,
        amount_out,
    })
}
