//! Shared fixtures for cross-crate ledger flows.
//!
//! A `Harness` wires a `SwapSettlementLedger` to an in-memory chain, an
//! event log and a single-owner authority, on top of either a real
//! constant-product router or a scripted one.

use std::sync::Arc;

use feeswap_core::{Address, LedgerSettings, TokenAmount};
use feeswap_ledger::adapters::{
    ConstantProductRouter, EventLog, InMemoryChain, RouterBehaviour, ScriptedRouter, SingleOwner,
};
use feeswap_ledger::{IRouter, IToken, LedgerDeps, LedgerEvent, SwapSettlementLedger};

pub fn weth() -> Address {
    Address::from_low_u64(0x1)
}

pub fn tka() -> Address {
    Address::from_low_u64(0xa)
}

pub fn tkb() -> Address {
    Address::from_low_u64(0xb)
}

pub fn tkc() -> Address {
    Address::from_low_u64(0xc)
}

pub fn owner() -> Address {
    Address::from_low_u64(0xad)
}

pub fn alice() -> Address {
    Address::from_low_u64(0xa11ce)
}

pub fn bob() -> Address {
    Address::from_low_u64(0xb0b)
}

/// Starting balance for funded traders.
pub const TRADER_FUNDS: TokenAmount = 1_000_000_000_000;

pub struct Harness {
    pub chain: Arc<InMemoryChain>,
    pub events: Arc<EventLog>,
    pub ledger: Arc<SwapSettlementLedger>,
    pub settings: LedgerSettings,
}

impl Harness {
    fn build(router: Arc<dyn IRouter>, chain: Arc<InMemoryChain>) -> Self {
        let events = Arc::new(EventLog::new());
        let settings = LedgerSettings::default();
        let deps = LedgerDeps {
            token: chain.clone(),
            env: chain.clone(),
            authority: Arc::new(SingleOwner::new(owner())),
            events: events.clone(),
        };
        let ledger = SwapSettlementLedger::new(&settings, router, deps)
            .expect("ledger construction should succeed");
        let harness = Self {
            chain,
            events,
            ledger: Arc::new(ledger),
            settings,
        };
        for trader in [alice(), bob()] {
            for token in [weth(), tka(), tkb(), tkc()] {
                harness.fund(&trader, &token, TRADER_FUNDS);
            }
        }
        harness
    }

    /// Ledger over a constant-product router with pools A/WETH, WETH/B and
    /// B/C.
    pub fn with_amm() -> (Self, Arc<ConstantProductRouter>) {
        let chain = Arc::new(InMemoryChain::new());
        let router = deploy_amm(&chain, Address::from_low_u64(0x90));
        let harness = Self::build(router.clone(), chain);
        (harness, router)
    }

    /// Ledger over a scripted router funded with every output token.
    pub fn with_scripted(behaviour: RouterBehaviour) -> (Self, Arc<ScriptedRouter>) {
        let chain = Arc::new(InMemoryChain::new());
        let router = Arc::new(ScriptedRouter::new(
            Address::from_low_u64(0x99),
            chain.clone(),
            behaviour,
        ));
        for token in [weth(), tka(), tkb(), tkc()] {
            chain.mint(&token, &router.address(), TRADER_FUNDS);
        }
        let harness = Self::build(router.clone(), chain);
        (harness, router)
    }

    /// Mint `amount` of `token` to `trader` and approve the ledger for it.
    pub fn fund(&self, trader: &Address, token: &Address, amount: TokenAmount) {
        self.chain.mint(token, trader, amount);
        self.chain
            .approve(token, trader, &self.ledger.address(), TokenAmount::MAX);
    }

    pub fn balance(&self, token: &Address, account: &Address) -> TokenAmount {
        self.chain.balance_of(token, account)
    }

    pub fn fee_collector(&self) -> Address {
        self.settings.fee_collector
    }

    /// Swap ids carried by every published `SwapExecuted` event.
    pub fn swap_ids(&self) -> Vec<u64> {
        self.events
            .events()
            .iter()
            .filter_map(|e| match e {
                LedgerEvent::SwapExecuted(record) => Some(record.swap_id),
                _ => None,
            })
            .collect()
    }
}

/// Deploy a constant-product router with the standard pool set.
pub fn deploy_amm(chain: &Arc<InMemoryChain>, address: Address) -> Arc<ConstantProductRouter> {
    let router = Arc::new(ConstantProductRouter::new(address, chain.clone(), chain.clone()));
    for (a, b, ra, rb) in [
        (tka(), weth(), 10_000_000_000u128, 5_000_000_000u128),
        (weth(), tkb(), 5_000_000_000, 20_000_000_000),
        (tkb(), tkc(), 20_000_000_000, 20_000_000_000),
    ] {
        let vault = router.create_pool(&a, &b);
        chain.mint(&a, &vault, ra);
        chain.mint(&b, &vault, rb);
    }
    router
}
