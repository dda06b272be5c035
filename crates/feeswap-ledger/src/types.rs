use feeswap_core::{Address, EpochSnapshot, LedgerConfig, SwapRecord, TokenAmount};
use serde::{Deserialize, Serialize};

/// Audit record published by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// One single-pair or multi-hop swap completed.
    SwapExecuted(SwapRecord),
    /// A whole batch completed.
    BatchExecuted {
        trader: Address,
        first_swap_id: u64,
        legs: usize,
        #[serde(with = "feeswap_core::amount")]
        total_in: TokenAmount,
        #[serde(with = "feeswap_core::amount")]
        total_out: TokenAmount,
        #[serde(with = "feeswap_core::amount")]
        total_fee: TokenAmount,
    },
    /// The active router was replaced.
    RouterUpdated {
        previous: Address,
        new: Address,
        /// 1-based update ordinal.
        ordinal: u32,
    },
    /// A reconciliation snapshot was sealed.
    SnapshotSealed {
        snapshot: EpochSnapshot,
        /// Snapshot previously stored under the same epoch id, if any.
        replaced: Option<EpochSnapshot>,
    },
    PauseChanged { paused: bool },
}

impl LedgerEvent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SwapExecuted(_) => "swap_executed",
            Self::BatchExecuted { .. } => "batch_executed",
            Self::RouterUpdated { .. } => "router_updated",
            Self::SnapshotSealed { .. } => "snapshot_sealed",
            Self::PauseChanged { .. } => "pause_changed",
        }
    }
}

/// Result of a single or multi-hop swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub amount_out: TokenAmount,
    pub fee: TokenAmount,
}

/// Result of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub total_out: TokenAmount,
    pub total_fee: TokenAmount,
}

/// Point-in-time summary of ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatus {
    pub address: Address,
    pub config: LedgerConfig,
    pub router: Address,
    pub router_updates: u32,
    pub router_update_cap: u32,
    pub paused: bool,
    pub swap_count: u64,
    pub snapshots: Vec<EpochSnapshot>,
}
