use feeswap_core::{Address, TokenAmount};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::RouterError;
use crate::traits::{IRouter, IToken, SwapRequest};

/// What a `ScriptedRouter` does when asked to swap or quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterBehaviour {
    /// Pull the input and pay exactly this much of the output token out of
    /// the router's own balance.
    Deliver(TokenAmount),
    /// Fail with `RouterError::Reverted(reason)` without moving anything.
    Revert(String),
    /// Pull the input and report this output without paying anything.
    ClaimWithoutDelivery(TokenAmount),
    /// Pull the input and return a single-element amounts vector.
    Malformed,
}

/// Callback run at the start of every swap, before any tokens move.
pub type SwapHook = Box<dyn Fn(&SwapRequest) -> Result<(), RouterError> + Send + Sync>;

/// Deterministic router double for exercising the ledger's failure paths.
///
/// The router pays outputs from its own account, so fund
/// `router.address()` with the output token before a `Deliver` swap.
pub struct ScriptedRouter {
    address: Address,
    token: Arc<dyn IToken>,
    behaviour: Mutex<RouterBehaviour>,
    hook: Mutex<Option<SwapHook>>,
    calls: Mutex<Vec<SwapRequest>>,
    /// Allowance granted by the sender, observed on entry to each swap.
    observed_allowances: Mutex<Vec<TokenAmount>>,
}

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedRouter {
    pub fn new(address: Address, token: Arc<dyn IToken>, behaviour: RouterBehaviour) -> Self {
        Self {
            address,
            token,
            behaviour: Mutex::new(behaviour),
            hook: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            observed_allowances: Mutex::new(Vec::new()),
        }
    }

    pub fn set_behaviour(&self, behaviour: RouterBehaviour) {
        *locked(&self.behaviour) = behaviour;
    }

    /// Install a callback run on every swap. An error from the hook aborts
    /// the swap with that error.
    pub fn set_hook(&self, hook: SwapHook) {
        *locked(&self.hook) = Some(hook);
    }

    /// Swap requests received so far, including failed ones.
    pub fn calls(&self) -> Vec<SwapRequest> {
        locked(&self.calls).clone()
    }

    pub fn observed_allowances(&self) -> Vec<TokenAmount> {
        locked(&self.observed_allowances).clone()
    }

    fn pull_input(&self, request: &SwapRequest) -> Result<(), RouterError> {
        let token_in = request
            .path
            .first()
            .ok_or_else(|| RouterError::Reverted("empty path".into()))?;
        if self
            .token
            .transfer_from(token_in, &self.address, &request.sender, &self.address, request.amount_in)
        {
            Ok(())
        } else {
            Err(RouterError::Reverted("input transfer failed".into()))
        }
    }
}

impl IRouter for ScriptedRouter {
    fn address(&self) -> Address {
        self.address
    }

    fn get_amounts_out(
        &self,
        amount_in: TokenAmount,
        _path: &[Address],
    ) -> Result<Vec<TokenAmount>, RouterError> {
        match locked(&self.behaviour).clone() {
            RouterBehaviour::Deliver(out) | RouterBehaviour::ClaimWithoutDelivery(out) => {
                Ok(vec![amount_in, out])
            }
            RouterBehaviour::Revert(reason) => Err(RouterError::Reverted(reason)),
            RouterBehaviour::Malformed => Ok(vec![amount_in]),
        }
    }

    fn swap_exact_in(&self, request: &SwapRequest) -> Result<Vec<TokenAmount>, RouterError> {
        locked(&self.calls).push(request.clone());
        if let Some(token_in) = request.path.first() {
            let allowance = self.token.allowance(token_in, &request.sender, &self.address);
            locked(&self.observed_allowances).push(allowance);
        }

        if let Some(hook) = locked(&self.hook).as_ref() {
            hook(request)?;
        }

        let behaviour = locked(&self.behaviour).clone();
        match behaviour {
            RouterBehaviour::Revert(reason) => Err(RouterError::Reverted(reason)),
            RouterBehaviour::Deliver(out) => {
                self.pull_input(request)?;
                let token_out = request
                    .path
                    .last()
                    .ok_or_else(|| RouterError::Reverted("empty path".into()))?;
                if !self.token.transfer(token_out, &self.address, &request.recipient, out) {
                    return Err(RouterError::Reverted("output transfer failed".into()));
                }
                Ok(vec![request.amount_in, out])
            }
            RouterBehaviour::ClaimWithoutDelivery(out) => {
                self.pull_input(request)?;
                Ok(vec![request.amount_in, out])
            }
            RouterBehaviour::Malformed => {
                self.pull_input(request)?;
                Ok(vec![request.amount_in])
            }
        }
    }
}
