use feeswap_core::{Address, CoreError};

/// Ledger-level errors.
///
/// Every variant is a hard failure: the call that produced it leaves no
/// observable effect behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("amount must be positive")]
    ZeroAmount,

    #[error("zero address supplied for {0}")]
    ZeroAddress(&'static str),

    #[error("batch contains no legs")]
    EmptyBatch,

    #[error("path length {len} outside [{min}, {max}]")]
    InvalidPathLength { len: usize, min: usize, max: usize },

    #[error("inbound transfer of {amount} {token} from {from} failed")]
    TransferInFailed {
        token: Address,
        from: Address,
        amount: u128,
    },

    #[error("fee transfer of {amount} {token} to collector failed")]
    FeeTransferFailed { token: Address, amount: u128 },

    #[error("router approval for {token} failed")]
    ApprovalFailed { token: Address },

    #[error("router call failed: {0}")]
    RouterCallFailed(String),

    #[error("no output observed for {token} at {recipient}")]
    SlippageOrTransferOut { token: Address, recipient: Address },

    #[error("ledger is paused")]
    Paused,

    #[error("reentrant call rejected")]
    Reentrancy,

    #[error("router update cap of {cap} reached")]
    RouterUpdateCapReached { cap: u32 },

    #[error("caller {0} is not authorized")]
    Unauthorized(Address),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ZeroAmount => Self::ZeroAmount,
            CoreError::ZeroAddress(field) => Self::ZeroAddress(field),
            CoreError::InvalidPathLength { len, min, max } => {
                Self::InvalidPathLength { len, min, max }
            }
            CoreError::UpdateCapExhausted(state) => Self::RouterUpdateCapReached { cap: state.cap() },
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Failure reported by a router collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("router reverted: {0}")]
    Reverted(String),

    #[error("no pool for {0} -> {1}")]
    NoPool(Address, Address),

    #[error("insufficient output: got {got}, minimum {min}")]
    InsufficientOutput { got: u128, min: u128 },

    #[error("deadline {deadline} passed at {now}")]
    Expired { deadline: u64, now: u64 },
}
