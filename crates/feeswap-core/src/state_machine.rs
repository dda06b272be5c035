use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::fee::ROUTER_UPDATE_CAP;

/// Bounded counter of router replacements.
///
/// States run `0..=cap`. The only transition is `advance`, which moves one
/// step forward and refuses to leave `cap`. Reaching `cap` is terminal for
/// router updates only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouterUpdateState {
    count: u32,
    cap: u32,
}

impl RouterUpdateState {
    /// Fresh state with the protocol cap.
    pub fn new() -> Self {
        Self::with_cap(ROUTER_UPDATE_CAP)
    }

    /// Fresh state with an explicit cap.
    pub fn with_cap(cap: u32) -> Self {
        Self { count: 0, cap }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn remaining(&self) -> u32 {
        self.cap - self.count
    }

    /// Whether no further updates are possible.
    pub fn is_exhausted(&self) -> bool {
        self.count >= self.cap
    }

    /// Move to the next ordinal. Fails once the cap is reached.
    pub fn advance(self) -> Result<Self, CoreError> {
        if self.is_exhausted() {
            return Err(CoreError::UpdateCapExhausted(self));
        }
        let next = Self {
            count: self.count + 1,
            cap: self.cap,
        };
        tracing::debug!(from = %self, to = %next, "router update state transition");
        Ok(next)
    }
}

impl Default for RouterUpdateState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RouterUpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.count, self.cap)
    }
}
