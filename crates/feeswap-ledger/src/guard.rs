use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::LedgerError;

/// Single-flight execution lock.
///
/// Held for the whole duration of a guarded call. Any attempt to enter
/// while held, including from a collaborator called back mid-call, is
/// rejected with `LedgerError::Reentrancy`.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: AtomicBool,
}

/// Releases the guard on drop, including on early return and unwinding.
#[must_use = "the guard is released as soon as the token is dropped"]
#[derive(Debug)]
pub struct GuardToken<'a> {
    guard: &'a ReentrancyGuard,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock or fail if a call is already in flight.
    pub fn enter(&self) -> Result<GuardToken<'_>, LedgerError> {
        self.entered
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| LedgerError::Reentrancy)?;
        Ok(GuardToken { guard: self })
    }
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}
