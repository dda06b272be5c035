//! Protocol fee math and fixed protocol constants.
//!
//! The protocol fee is a flat `FEE_BPS / FEE_DENOMINATOR` (0.10%) of the
//! gross input, rounded down. `fee + net == amount` always holds.

use serde::{Deserialize, Serialize};

use crate::types::TokenAmount;

/// Protocol fee in basis points (10 = 0.10%).
pub const FEE_BPS: u128 = 10;

/// Basis-point denominator.
pub const FEE_DENOMINATOR: u128 = 10_000;

/// Maximum number of router replacements over the ledger's lifetime.
pub const ROUTER_UPDATE_CAP: u32 = 5;

/// Shortest accepted multi-hop path.
pub const MIN_PATH_LEN: usize = 2;

/// Longest accepted multi-hop path.
pub const MAX_PATH_LEN: usize = 6;

/// Gross input split into protocol fee and the amount routed onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub fee: TokenAmount,
    pub net: TokenAmount,
}

/// `floor(amount * FEE_BPS / FEE_DENOMINATOR)`.
///
/// Computed as quotient and remainder parts so the full `u128` range is
/// accepted without overflow.
#[inline]
pub fn compute_fee(amount: TokenAmount) -> TokenAmount {
    let whole = (amount / FEE_DENOMINATOR) * FEE_BPS;
    let part = (amount % FEE_DENOMINATOR) * FEE_BPS / FEE_DENOMINATOR;
    whole + part
}

/// Split `amount` into fee and net.
#[inline]
pub fn split_fee(amount: TokenAmount) -> FeeSplit {
    let fee = compute_fee(amount);
    FeeSplit {
        fee,
        net: amount - fee,
    }
}
