use crate::types::LedgerEvent;

/// Ledger-side effects staged during one guarded call.
///
/// Swap ids are reserved against the counter value observed when the call
/// began. Nothing here touches ledger state until the owner commits, and a
/// dropped unit of work leaves no trace.
#[derive(Debug)]
pub struct UnitOfWork {
    base_swap_count: u64,
    staged_swaps: u64,
    events: Vec<LedgerEvent>,
}

impl UnitOfWork {
    /// Begin staging on top of the current swap counter.
    pub fn begin(base_swap_count: u64) -> Self {
        Self {
            base_swap_count,
            staged_swaps: 0,
            events: Vec::new(),
        }
    }

    /// Reserve the next swap id.
    pub fn next_swap_id(&mut self) -> u64 {
        self.staged_swaps += 1;
        self.base_swap_count + self.staged_swaps
    }

    /// Id the next reservation would return.
    pub fn peek_swap_id(&self) -> u64 {
        self.base_swap_count + self.staged_swaps + 1
    }

    /// Swap ids reserved so far.
    pub fn staged_swaps(&self) -> u64 {
        self.staged_swaps
    }

    /// Swap counter value after commit.
    pub fn final_swap_count(&self) -> u64 {
        self.base_swap_count + self.staged_swaps
    }

    pub fn stage(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Consume into the final counter value and the events to publish.
    pub fn into_parts(self) -> (u64, Vec<LedgerEvent>) {
        let count = self.final_swap_count();
        (count, self.events)
    }
}
