//! In-memory deployment of a ledger built from a `FeeswapConfig`.

use anyhow::Context;
use feeswap_core::{Address, EpochSnapshot, SwapLeg, TokenAmount};
use feeswap_ledger::adapters::{ConstantProductRouter, EventLog, InMemoryChain, SingleOwner};
use feeswap_ledger::{
    BatchOutcome, IEnvironment, IToken, LedgerDeps, LedgerError, LedgerEvent, SwapOutcome,
    SwapSettlementLedger,
};
use serde::Serialize;
use std::sync::Arc;

use crate::config::{FeeswapConfig, PoolConfig};
use crate::scenario::Step;

/// Successful result of one scenario step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    Swap(SwapOutcome),
    Batch(BatchOutcome),
    Quote { amount_out: TokenAmount },
    RouterUpdated { ordinal: u32 },
    Sealed { replaced: Option<EpochSnapshot> },
    PauseSet { paused: bool },
    Advanced { height: u64, timestamp: u64 },
}

/// What happened when a step ran, including the events it published.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<StepOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub events: Vec<LedgerEvent>,
}

pub struct Simulation {
    chain: Arc<InMemoryChain>,
    events: Arc<EventLog>,
    pools: Vec<PoolConfig>,
    ledger: SwapSettlementLedger,
}

impl Simulation {
    /// Deploy the chain, initial router, funded accounts and ledger.
    pub fn from_config(config: &FeeswapConfig) -> anyhow::Result<Self> {
        let chain = Arc::new(InMemoryChain::with_clock(
            config.chain.height,
            config.chain.timestamp,
        ));
        let events = Arc::new(EventLog::new());
        let pools = config.pools.clone();

        let router = build_router(&chain, &pools, config.router.address);
        seed_pools(&chain, &router, &pools);
        let deps = LedgerDeps {
            token: chain.clone(),
            env: chain.clone(),
            authority: Arc::new(SingleOwner::new(config.ledger.owner)),
            events: events.clone(),
        };
        let ledger = SwapSettlementLedger::new(&config.ledger.settings, router, deps)
            .context("constructing ledger")?;

        for account in &config.accounts {
            chain.mint(&account.token, &account.address, u128::from(account.balance));
            if account.approve_ledger {
                chain.approve(&account.token, &account.address, &ledger.address(), u128::MAX);
            }
        }

        tracing::info!(
            pools = pools.len(),
            accounts = config.accounts.len(),
            ledger = %ledger.address(),
            "simulation deployed"
        );
        Ok(Self {
            chain,
            events,
            pools,
            ledger,
        })
    }

    pub fn ledger(&self) -> &SwapSettlementLedger {
        &self.ledger
    }

    pub fn chain(&self) -> &InMemoryChain {
        &self.chain
    }

    /// Run one step and collect the events it published.
    pub fn run_step(&self, index: usize, step: &Step) -> StepReport {
        let result = self.apply(step);
        let events = self.events.drain();
        match result {
            Ok(outcome) => StepReport {
                step: index,
                op: step.op(),
                outcome: Some(outcome),
                error: None,
                events,
            },
            Err(e) => {
                tracing::warn!(step = index, op = step.op(), error = %e, "step failed");
                StepReport {
                    step: index,
                    op: step.op(),
                    outcome: None,
                    error: Some(e.to_string()),
                    events,
                }
            }
        }
    }

    fn apply(&self, step: &Step) -> Result<StepOutcome, LedgerError> {
        let ledger = &self.ledger;
        match step {
            Step::Swap {
                caller,
                token_in,
                token_out,
                amount_in,
                min_out,
                deadline,
            } => ledger
                .execute_exact_in_swap(
                    caller,
                    token_in,
                    token_out,
                    u128::from(*amount_in),
                    u128::from(*min_out),
                    *deadline,
                )
                .map(StepOutcome::Swap),
            Step::Batch { caller, legs } => {
                let legs: Vec<SwapLeg> = legs.iter().map(SwapLeg::from).collect();
                ledger
                    .execute_exact_in_batch(caller, &legs)
                    .map(StepOutcome::Batch)
            }
            Step::Multihop {
                caller,
                path,
                amount_in,
                min_out,
                deadline,
            } => ledger
                .execute_exact_in_multi_hop(
                    caller,
                    path,
                    u128::from(*amount_in),
                    u128::from(*min_out),
                    *deadline,
                )
                .map(StepOutcome::Swap),
            Step::Quote { path, amount_in } => Ok(StepOutcome::Quote {
                amount_out: match path.as_slice() {
                    [token_in, token_out] => {
                        ledger.quote_exact_in(token_in, token_out, u128::from(*amount_in))
                    }
                    _ => ledger.quote_exact_in_multi_hop(path, u128::from(*amount_in)),
                },
            }),
            Step::QuoteNet { path, amount_in } => Ok(StepOutcome::Quote {
                amount_out: match path.as_slice() {
                    [token_in, token_out] => {
                        ledger.quote_exact_in_net(token_in, token_out, u128::from(*amount_in))
                    }
                    _ => ledger.quote_exact_in_multi_hop_net(path, u128::from(*amount_in)),
                },
            }),
            Step::SetRouter { caller, address } => {
                let router = build_router(&self.chain, &self.pools, *address);
                let ordinal = ledger.set_router(caller, router.clone())?;
                seed_pools(&self.chain, &router, &self.pools);
                Ok(StepOutcome::RouterUpdated { ordinal })
            }
            Step::Seal { caller, epoch_id } => ledger
                .seal_snapshot(caller, *epoch_id)
                .map(|replaced| StepOutcome::Sealed { replaced }),
            Step::Pause { caller, paused } => ledger
                .set_paused(caller, *paused)
                .map(|()| StepOutcome::PauseSet { paused: *paused }),
            Step::Advance { blocks, seconds } => {
                self.chain.advance_block(*blocks, *seconds);
                Ok(StepOutcome::Advanced {
                    height: self.chain.block_height(),
                    timestamp: self.chain.timestamp(),
                })
            }
        }
    }
}

/// Build a constant-product router at `address` with every configured pool
/// registered but unfunded.
fn build_router(
    chain: &Arc<InMemoryChain>,
    pools: &[PoolConfig],
    address: Address,
) -> Arc<ConstantProductRouter> {
    let router = Arc::new(ConstantProductRouter::new(address, chain.clone(), chain.clone()));
    for pool in pools {
        router.create_pool(&pool.token_a, &pool.token_b);
    }
    router
}

/// Mint the configured reserves into each of the router's empty vaults.
///
/// Vault addresses depend only on router address and pair, so a router
/// re-deployed at a live address finds its pools already funded.
fn seed_pools(chain: &InMemoryChain, router: &ConstantProductRouter, pools: &[PoolConfig]) {
    for pool in pools {
        let Some(vault) = router.pool_vault(&pool.token_a, &pool.token_b) else {
            continue;
        };
        let funded = chain.balance_of(&pool.token_a, &vault) > 0
            || chain.balance_of(&pool.token_b, &vault) > 0;
        if funded {
            tracing::debug!(%vault, "pool already funded");
            continue;
        }
        chain.mint(&pool.token_a, &vault, u128::from(pool.reserve_a));
        chain.mint(&pool.token_b, &vault, u128::from(pool.reserve_b));
    }
}
