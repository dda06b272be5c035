//! Feeswap settlement ledger.
//!
//! `SwapSettlementLedger` wraps an AMM router, takes a protocol fee off
//! every exact-input swap and credits outputs by observed balance change.
//! Collaborators (token, router, environment, authority, event sink) are
//! traits with in-memory adapters for tests and local simulation.

pub mod adapters;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod traits;
pub mod types;
pub mod unit_of_work;

pub use error::{LedgerError, RouterError};
pub use guard::{GuardToken, ReentrancyGuard};
pub use ledger::{LedgerDeps, SwapSettlementLedger};
pub use traits::{Checkpoint, IAuthority, IEnvironment, IEventSink, IRouter, IToken, SwapRequest};
pub use types::{BatchOutcome, LedgerEvent, LedgerStatus, SwapOutcome};
pub use unit_of_work::UnitOfWork;
