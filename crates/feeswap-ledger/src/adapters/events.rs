use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::traits::IEventSink;
use crate::types::LedgerEvent;

/// In-memory audit stream.
///
/// Every published event is also emitted as a `tracing` record under the
/// `feeswap::audit` target.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<LedgerEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<LedgerEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of all events in publication order.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Remove and return all events.
    pub fn drain(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut *self.entries())
    }
}

impl IEventSink for EventLog {
    fn publish(&self, event: LedgerEvent) {
        tracing::info!(target: "feeswap::audit", kind = event.kind(), ?event, "audit event");
        self.entries().push(event);
    }
}
