use feeswap_core::{Address, TokenAmount};

use crate::error::RouterError;
use crate::types::LedgerEvent;

/// Token transfer/approval mechanism.
///
/// Mirrors a fungible-token interface where every mutating call reports
/// success as a boolean. `false` means nothing moved.
pub trait IToken: Send + Sync {
    /// Move `amount` of `token` from `from` to `to`, spending `spender`'s
    /// allowance granted by `from`.
    fn transfer_from(
        &self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> bool;

    /// Move `amount` of `token` from `from` to `to`.
    fn transfer(&self, token: &Address, from: &Address, to: &Address, amount: TokenAmount) -> bool;

    /// Set `spender`'s allowance over `owner`'s `token` to exactly `amount`.
    fn approve(&self, token: &Address, owner: &Address, spender: &Address, amount: TokenAmount)
        -> bool;

    /// Current balance of `account`.
    fn balance_of(&self, token: &Address, account: &Address) -> TokenAmount;

    /// Remaining allowance `owner` has granted `spender`.
    fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> TokenAmount;
}

/// Arguments for a router exact-input swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    /// Account whose allowance funds the swap.
    pub sender: Address,
    pub amount_in: TokenAmount,
    pub amount_out_min: TokenAmount,
    pub path: Vec<Address>,
    pub recipient: Address,
    pub deadline: u64,
}

/// External automated-market-maker router.
pub trait IRouter: Send + Sync {
    /// On-chain address of the router; the spender the ledger approves.
    fn address(&self) -> Address;

    /// Quote the per-hop amounts for `amount_in` along `path`.
    fn get_amounts_out(
        &self,
        amount_in: TokenAmount,
        path: &[Address],
    ) -> Result<Vec<TokenAmount>, RouterError>;

    /// Execute an exact-input swap. Returns the per-hop amounts the router
    /// claims to have produced.
    fn swap_exact_in(&self, request: &SwapRequest) -> Result<Vec<TokenAmount>, RouterError>;
}

/// Opaque marker for a revertible point in the execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checkpoint(pub u64);

/// Execution environment: block clock plus atomic-call semantics.
pub trait IEnvironment: Send + Sync {
    /// Current block height.
    fn block_height(&self) -> u64;

    /// Current block timestamp (unix seconds).
    fn timestamp(&self) -> u64;

    /// Open a revertible point covering all token state.
    fn checkpoint(&self) -> Checkpoint;

    /// Discard every effect since `checkpoint` and close it.
    fn revert_to(&self, checkpoint: Checkpoint);

    /// Keep every effect since `checkpoint` and close it.
    fn release(&self, checkpoint: Checkpoint);
}

/// Ownership / access-control capability for privileged operations.
pub trait IAuthority: Send + Sync {
    fn is_authorized(&self, caller: &Address) -> bool;
}

/// Durable audit trail.
pub trait IEventSink: Send + Sync {
    fn publish(&self, event: LedgerEvent);
}
