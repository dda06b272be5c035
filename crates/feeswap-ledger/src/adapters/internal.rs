use dashmap::DashMap;
use feeswap_core::{Address, TokenAmount};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::traits::{Checkpoint, IEnvironment, IToken};

type BalanceKey = (Address, Address);
type AllowanceKey = (Address, Address, Address);

/// Copy of all token state taken when a checkpoint opens.
#[derive(Debug, Clone, Default)]
struct ChainState {
    balances: HashMap<BalanceKey, TokenAmount>,
    allowances: HashMap<AllowanceKey, TokenAmount>,
}

/// In-memory multi-token chain.
///
/// Holds balances and allowances for any number of tokens, a block clock,
/// and a stack of checkpoints giving the all-or-nothing call semantics the
/// ledger relies on. Useful for tests and for local simulation where no
/// real chain is available.
pub struct InMemoryChain {
    /// (token, account) -> balance.
    balances: DashMap<BalanceKey, TokenAmount>,
    /// (token, owner, spender) -> allowance.
    allowances: DashMap<AllowanceKey, TokenAmount>,
    height: AtomicU64,
    timestamp: AtomicU64,
    next_checkpoint: AtomicU64,
    checkpoints: Mutex<Vec<(Checkpoint, ChainState)>>,
}

impl InMemoryChain {
    /// Default genesis clock: height 1, 2023-11-14T22:13:20Z.
    pub const GENESIS_HEIGHT: u64 = 1;
    pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

    /// Create an empty chain at the default genesis clock.
    pub fn new() -> Self {
        Self::with_clock(Self::GENESIS_HEIGHT, Self::GENESIS_TIMESTAMP)
    }

    /// Create an empty chain at an explicit clock.
    pub fn with_clock(height: u64, timestamp: u64) -> Self {
        Self {
            balances: DashMap::new(),
            allowances: DashMap::new(),
            height: AtomicU64::new(height),
            timestamp: AtomicU64::new(timestamp),
            next_checkpoint: AtomicU64::new(1),
            checkpoints: Mutex::new(Vec::new()),
        }
    }

    /// Credit `amount` of `token` to `account` out of thin air.
    pub fn mint(&self, token: &Address, account: &Address, amount: TokenAmount) {
        self.credit((*token, *account), amount);
        tracing::debug!(%token, %account, amount, "minted");
    }

    /// Move the clock forward.
    pub fn advance_block(&self, blocks: u64, seconds: u64) {
        self.height.fetch_add(blocks, Ordering::SeqCst);
        self.timestamp.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Number of open checkpoints.
    pub fn open_checkpoints(&self) -> usize {
        self.journal().len()
    }

    fn journal(&self) -> MutexGuard<'_, Vec<(Checkpoint, ChainState)>> {
        self.checkpoints.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn capture(&self) -> ChainState {
        ChainState {
            balances: self.balances.iter().map(|e| (*e.key(), *e.value())).collect(),
            allowances: self.allowances.iter().map(|e| (*e.key(), *e.value())).collect(),
        }
    }

    fn restore(&self, state: ChainState) {
        self.balances.clear();
        self.allowances.clear();
        for (key, value) in state.balances {
            self.balances.insert(key, value);
        }
        for (key, value) in state.allowances {
            self.allowances.insert(key, value);
        }
    }

    fn balance(&self, key: &BalanceKey) -> TokenAmount {
        self.balances.get(key).map(|v| *v).unwrap_or(0)
    }

    fn credit(&self, key: BalanceKey, amount: TokenAmount) {
        self.balances
            .entry(key)
            .and_modify(|b| *b = b.saturating_add(amount))
            .or_insert(amount);
    }

    /// Move funds if `from` holds enough. Leaves state untouched otherwise.
    fn move_funds(&self, token: &Address, from: &Address, to: &Address, amount: TokenAmount) -> bool {
        let from_key = (*token, *from);
        match self.balances.get_mut(&from_key) {
            Some(mut balance) if *balance >= amount => *balance -= amount,
            _ if amount == 0 => {}
            _ => return false,
        }
        self.credit((*token, *to), amount);
        true
    }
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl IToken for InMemoryChain {
    fn transfer_from(
        &self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> bool {
        let allowance_key = (*token, *from, *spender);
        let allowed = self.allowances.get(&allowance_key).map(|v| *v).unwrap_or(0);
        if allowed < amount || self.balance(&(*token, *from)) < amount {
            tracing::debug!(%token, %spender, %from, amount, allowed, "transfer_from rejected");
            return false;
        }
        self.allowances.insert(allowance_key, allowed - amount);
        self.move_funds(token, from, to, amount)
    }

    fn transfer(&self, token: &Address, from: &Address, to: &Address, amount: TokenAmount) -> bool {
        let moved = self.move_funds(token, from, to, amount);
        if !moved {
            tracing::debug!(%token, %from, %to, amount, "transfer rejected");
        }
        moved
    }

    fn approve(&self, token: &Address, owner: &Address, spender: &Address, amount: TokenAmount) -> bool {
        if amount == 0 {
            self.allowances.remove(&(*token, *owner, *spender));
        } else {
            self.allowances.insert((*token, *owner, *spender), amount);
        }
        true
    }

    fn balance_of(&self, token: &Address, account: &Address) -> TokenAmount {
        self.balance(&(*token, *account))
    }

    fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> TokenAmount {
        self.allowances
            .get(&(*token, *owner, *spender))
            .map(|v| *v)
            .unwrap_or(0)
    }
}

impl IEnvironment for InMemoryChain {
    fn block_height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }

    fn timestamp(&self) -> u64 {
        self.timestamp.load(Ordering::SeqCst)
    }

    fn checkpoint(&self) -> Checkpoint {
        let checkpoint = Checkpoint(self.next_checkpoint.fetch_add(1, Ordering::SeqCst));
        let state = self.capture();
        self.journal().push((checkpoint, state));
        checkpoint
    }

    fn revert_to(&self, checkpoint: Checkpoint) {
        let mut journal = self.journal();
        let Some(pos) = journal.iter().position(|(cp, _)| *cp == checkpoint) else {
            tracing::warn!(checkpoint = checkpoint.0, "revert to unknown checkpoint ignored");
            return;
        };
        let (_, state) = journal.swap_remove(pos);
        journal.truncate(pos);
        drop(journal);
        self.restore(state);
        tracing::debug!(checkpoint = checkpoint.0, "chain state reverted");
    }

    fn release(&self, checkpoint: Checkpoint) {
        let mut journal = self.journal();
        if let Some(pos) = journal.iter().position(|(cp, _)| *cp == checkpoint) {
            journal.truncate(pos);
        }
    }
}
