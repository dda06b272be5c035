use crate::state_machine::RouterUpdateState;

/// Core protocol errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("router update cap exhausted at {0}")]
    UpdateCapExhausted(RouterUpdateState),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("zero address supplied for {0}")]
    ZeroAddress(&'static str),

    #[error("amount must be positive")]
    ZeroAmount,

    #[error("path length {len} outside [{min}, {max}]")]
    InvalidPathLength { len: usize, min: usize, max: usize },

    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),
}
