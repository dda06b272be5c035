//! Feeswap core types.
//!
//! Addresses, swap legs and records, epoch snapshots, protocol fee math and
//! the bounded router-update state machine shared by the ledger and CLI.

pub mod amount;
pub mod config;
pub mod error;
pub mod fee;
pub mod state_machine;
pub mod types;

pub use config::{LedgerConfig, LedgerSettings};
pub use error::CoreError;
pub use fee::{
    compute_fee, split_fee, FeeSplit, FEE_BPS, FEE_DENOMINATOR, MAX_PATH_LEN, MIN_PATH_LEN,
    ROUTER_UPDATE_CAP,
};
pub use state_machine::RouterUpdateState;
pub use types::{validate_path, Address, EpochSnapshot, SwapLeg, SwapRecord, TokenAmount};
