use chrono::{DateTime, Utc};
use feeswap_core::{
    split_fee, validate_path, Address, CoreError, EpochSnapshot, FeeSplit, LedgerConfig,
    LedgerSettings, RouterUpdateState, SwapLeg, SwapRecord, TokenAmount, MAX_PATH_LEN,
    MIN_PATH_LEN,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::LedgerError;
use crate::guard::ReentrancyGuard;
use crate::traits::{IAuthority, IEnvironment, IEventSink, IRouter, IToken, SwapRequest};
use crate::types::{BatchOutcome, LedgerEvent, LedgerStatus, SwapOutcome};
use crate::unit_of_work::UnitOfWork;

/// Collaborators a ledger is wired to.
#[derive(Clone)]
pub struct LedgerDeps {
    pub token: Arc<dyn IToken>,
    pub env: Arc<dyn IEnvironment>,
    pub authority: Arc<dyn IAuthority>,
    pub events: Arc<dyn IEventSink>,
}

/// Active router plus its bounded update history.
struct RouterReference {
    current: Arc<dyn IRouter>,
    updates: RouterUpdateState,
}

/// All mutable ledger state.
struct LedgerState {
    router: RouterReference,
    paused: bool,
    swap_count: u64,
    snapshots: BTreeMap<u64, EpochSnapshot>,
}

/// Fee-collecting wrapper around an AMM router.
///
/// Trading calls take the protocol fee off the input, route the rest
/// through the active router, and trust only the observed balance change
/// at the recipient for the output amount. Every trading call and every
/// privileged mutation runs under a single-flight guard; a failed call
/// reverts the environment to the checkpoint taken on entry and publishes
/// nothing.
pub struct SwapSettlementLedger {
    address: Address,
    config: LedgerConfig,
    deps: LedgerDeps,
    guard: ReentrancyGuard,
    state: Mutex<LedgerState>,
}

impl SwapSettlementLedger {
    /// Construct a ledger. Fails on any null configuration address or a
    /// null initial router.
    pub fn new(
        settings: &LedgerSettings,
        router: Arc<dyn IRouter>,
        deps: LedgerDeps,
    ) -> Result<Self, LedgerError> {
        let config = LedgerConfig::derive(settings, deps.env.block_height())?;
        router.address().require_non_zero("router")?;

        tracing::info!(
            ledger = %settings.address,
            router = %router.address(),
            fee_collector = %config.fee_collector,
            genesis_height = config.genesis_height,
            "swap settlement ledger created"
        );

        Ok(Self {
            address: settings.address,
            config,
            deps,
            guard: ReentrancyGuard::new(),
            state: Mutex::new(LedgerState {
                router: RouterReference {
                    current: router,
                    updates: RouterUpdateState::new(),
                },
                paused: false,
                swap_count: 0,
                snapshots: BTreeMap::new(),
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_router(&self) -> Arc<dyn IRouter> {
        Arc::clone(&self.state().router.current)
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Address of the active router.
    pub fn router(&self) -> Address {
        self.state().router.current.address()
    }

    pub fn router_update_count(&self) -> u32 {
        self.state().router.updates.count()
    }

    pub fn router_updates_remaining(&self) -> u32 {
        self.state().router.updates.remaining()
    }

    pub fn is_paused(&self) -> bool {
        self.state().paused
    }

    /// Id of the most recently completed swap (0 before the first).
    pub fn swap_count(&self) -> u64 {
        self.state().swap_count
    }

    pub fn snapshot(&self, epoch_id: u64) -> Option<EpochSnapshot> {
        self.state().snapshots.get(&epoch_id).cloned()
    }

    pub fn fee_split(&self, amount: TokenAmount) -> FeeSplit {
        split_fee(amount)
    }

    pub fn status(&self) -> LedgerStatus {
        let state = self.state();
        LedgerStatus {
            address: self.address,
            config: self.config.clone(),
            router: state.router.current.address(),
            router_updates: state.router.updates.count(),
            router_update_cap: state.router.updates.cap(),
            paused: state.paused,
            swap_count: state.swap_count,
            snapshots: state.snapshots.values().cloned().collect(),
        }
    }

    // ---------------------------------------------------------------------
    // Trading
    // ---------------------------------------------------------------------

    /// Swap an exact `amount_in` of `token_in` for `token_out`, paying the
    /// output to `caller`. Returns the observed output and the fee taken.
    pub fn execute_exact_in_swap(
        &self,
        caller: &Address,
        token_in: &Address,
        token_out: &Address,
        amount_in: TokenAmount,
        min_out: TokenAmount,
        deadline: u64,
    ) -> Result<SwapOutcome, LedgerError> {
        self.run_trade("swap", |router, uow| {
            caller.require_non_zero("caller")?;
            token_in.require_non_zero("token_in")?;
            token_out.require_non_zero("token_out")?;

            let record = self.execute_leg(
                router,
                uow,
                caller,
                &[*token_in, *token_out],
                amount_in,
                min_out,
                deadline,
            )?;
            let outcome = SwapOutcome {
                amount_out: record.amount_out,
                fee: record.fee,
            };
            uow.stage(LedgerEvent::SwapExecuted(record));
            Ok(outcome)
        })
    }

    /// Execute every leg in order as one all-or-nothing unit.
    pub fn execute_exact_in_batch(
        &self,
        caller: &Address,
        legs: &[SwapLeg],
    ) -> Result<BatchOutcome, LedgerError> {
        self.run_trade("batch", |router, uow| {
            caller.require_non_zero("caller")?;
            if legs.is_empty() {
                return Err(LedgerError::EmptyBatch);
            }

            let first_swap_id = uow.peek_swap_id();
            let mut total_in: TokenAmount = 0;
            let mut total_out: TokenAmount = 0;
            let mut total_fee: TokenAmount = 0;

            for (index, leg) in legs.iter().enumerate() {
                leg.token_in.require_non_zero("token_in")?;
                leg.token_out.require_non_zero("token_out")?;

                let record = self.execute_leg(
                    router,
                    uow,
                    caller,
                    &leg.path(),
                    leg.amount_in,
                    leg.min_out,
                    leg.deadline,
                )?;
                tracing::debug!(
                    leg = index,
                    swap_id = record.swap_id,
                    amount_out = record.amount_out,
                    "batch leg completed"
                );

                total_in = checked_total(total_in, record.amount_in, "batch input")?;
                total_out = checked_total(total_out, record.amount_out, "batch output")?;
                total_fee = checked_total(total_fee, record.fee, "batch fee")?;
            }

            uow.stage(LedgerEvent::BatchExecuted {
                trader: *caller,
                first_swap_id,
                legs: legs.len(),
                total_in,
                total_out,
                total_fee,
            });
            Ok(BatchOutcome {
                total_out,
                total_fee,
            })
        })
    }

    /// Swap along a path of 2 to 6 tokens. Fee and input are taken in
    /// `path[0]`; output is observed in the last token.
    pub fn execute_exact_in_multi_hop(
        &self,
        caller: &Address,
        path: &[Address],
        amount_in: TokenAmount,
        min_out: TokenAmount,
        deadline: u64,
    ) -> Result<SwapOutcome, LedgerError> {
        self.run_trade("multi_hop", |router, uow| {
            caller.require_non_zero("caller")?;
            validate_path(path)?;

            let record = self.execute_leg(router, uow, caller, path, amount_in, min_out, deadline)?;
            let outcome = SwapOutcome {
                amount_out: record.amount_out,
                fee: record.fee,
            };
            uow.stage(LedgerEvent::SwapExecuted(record));
            Ok(outcome)
        })
    }

    /// Guard, checkpoint and stage a trading call.
    fn run_trade<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&dyn IRouter, &mut UnitOfWork) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        if self.is_paused() {
            tracing::warn!(operation, "rejected: ledger paused");
            return Err(LedgerError::Paused);
        }
        let _entered = match self.guard.enter() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(operation, "rejected: reentrant call");
                return Err(e);
            }
        };

        let (router, base_swap_count) = {
            let state = self.state();
            (Arc::clone(&state.router.current), state.swap_count)
        };
        let checkpoint = self.deps.env.checkpoint();
        let mut uow = UnitOfWork::begin(base_swap_count);

        match body(router.as_ref(), &mut uow) {
            Ok(value) => {
                self.deps.env.release(checkpoint);
                self.commit(operation, uow);
                Ok(value)
            }
            Err(e) => {
                self.deps.env.revert_to(checkpoint);
                tracing::warn!(
                    operation,
                    error = %e,
                    discarded_swaps = uow.staged_swaps(),
                    "call reverted"
                );
                Err(e)
            }
        }
    }

    fn commit(&self, operation: &'static str, uow: UnitOfWork) {
        let (swap_count, events) = uow.into_parts();
        self.state().swap_count = swap_count;
        tracing::info!(operation, swap_count, events = events.len(), "call committed");
        for event in events {
            self.deps.events.publish(event);
        }
    }

    /// Fee split, custody, router call and delta verification for one leg.
    #[allow(clippy::too_many_arguments)]
    fn execute_leg(
        &self,
        router: &dyn IRouter,
        uow: &mut UnitOfWork,
        caller: &Address,
        path: &[Address],
        amount_in: TokenAmount,
        min_out: TokenAmount,
        deadline: u64,
    ) -> Result<SwapRecord, LedgerError> {
        if amount_in == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let (token_in, token_out) = match path {
            [first, .., last] => (*first, *last),
            _ => {
                return Err(LedgerError::InvalidPathLength {
                    len: path.len(),
                    min: MIN_PATH_LEN,
                    max: MAX_PATH_LEN,
                })
            }
        };
        let token = &self.deps.token;
        let FeeSplit { fee, net } = split_fee(amount_in);

        if !token.transfer_from(&token_in, &self.address, caller, &self.address, amount_in) {
            return Err(LedgerError::TransferInFailed {
                token: token_in,
                from: *caller,
                amount: amount_in,
            });
        }

        if fee > 0 && !token.transfer(&token_in, &self.address, &self.config.fee_collector, fee) {
            return Err(LedgerError::FeeTransferFailed {
                token: token_in,
                amount: fee,
            });
        }

        let spender = router.address();
        if !token.approve(&token_in, &self.address, &spender, net) {
            return Err(LedgerError::ApprovalFailed { token: token_in });
        }

        let balance_before = token.balance_of(&token_out, caller);
        let routed = router.swap_exact_in(&SwapRequest {
            sender: self.address,
            amount_in: net,
            amount_out_min: min_out,
            path: path.to_vec(),
            recipient: *caller,
            deadline,
        });
        let revoked = token.approve(&token_in, &self.address, &spender, 0);

        let claimed = match routed {
            Ok(amounts) => match amounts.as_slice() {
                [_, .., last] => *last,
                _ => {
                    return Err(LedgerError::RouterCallFailed(format!(
                        "malformed response with {} amounts",
                        amounts.len()
                    )))
                }
            },
            Err(e) => return Err(LedgerError::RouterCallFailed(e.to_string())),
        };
        if !revoked {
            return Err(LedgerError::ApprovalFailed { token: token_in });
        }

        let balance_after = token.balance_of(&token_out, caller);
        let observed = balance_after.saturating_sub(balance_before);
        if observed == 0 {
            return Err(LedgerError::SlippageOrTransferOut {
                token: token_out,
                recipient: *caller,
            });
        }
        if observed != claimed {
            tracing::debug!(claimed, observed, "router-reported output differs from observed delta");
        }

        let swap_id = uow.next_swap_id();
        tracing::debug!(swap_id, %token_in, %token_out, amount_in, fee, amount_out = observed, "leg executed");

        Ok(SwapRecord {
            swap_id,
            trader: *caller,
            token_in,
            token_out,
            amount_in,
            amount_out: observed,
            fee,
            hops: path.len() - 1,
        })
    }

    // ---------------------------------------------------------------------
    // Quotes (read-only, soft-fail to zero)
    // ---------------------------------------------------------------------

    /// Router estimate for the literal `amount_in`. Zero means no usable
    /// quote.
    pub fn quote_exact_in(
        &self,
        token_in: &Address,
        token_out: &Address,
        amount_in: TokenAmount,
    ) -> TokenAmount {
        self.quote_path(&[*token_in, *token_out], amount_in)
    }

    /// Router estimate after the protocol fee is taken off `amount_in`.
    pub fn quote_exact_in_net(
        &self,
        token_in: &Address,
        token_out: &Address,
        amount_in: TokenAmount,
    ) -> TokenAmount {
        self.quote_path(&[*token_in, *token_out], split_fee(amount_in).net)
    }

    pub fn quote_exact_in_multi_hop(&self, path: &[Address], amount_in: TokenAmount) -> TokenAmount {
        self.quote_path(path, amount_in)
    }

    pub fn quote_exact_in_multi_hop_net(
        &self,
        path: &[Address],
        amount_in: TokenAmount,
    ) -> TokenAmount {
        self.quote_path(path, split_fee(amount_in).net)
    }

    fn quote_path(&self, path: &[Address], amount_in: TokenAmount) -> TokenAmount {
        if amount_in == 0 || validate_path(path).is_err() {
            return 0;
        }
        match self.current_router().get_amounts_out(amount_in, path) {
            Ok(amounts) => match amounts.as_slice() {
                [_, .., last] => *last,
                _ => {
                    tracing::debug!(len = amounts.len(), "degenerate router quote");
                    0
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "router quote failed");
                0
            }
        }
    }

    // ---------------------------------------------------------------------
    // Privileged
    // ---------------------------------------------------------------------

    fn authorize(&self, caller: &Address, operation: &'static str) -> Result<(), LedgerError> {
        if self.deps.authority.is_authorized(caller) {
            Ok(())
        } else {
            tracing::warn!(%caller, operation, "rejected: unauthorized");
            Err(LedgerError::Unauthorized(*caller))
        }
    }

    /// Replace the active router. Returns the new update ordinal.
    pub fn set_router(
        &self,
        caller: &Address,
        new_router: Arc<dyn IRouter>,
    ) -> Result<u32, LedgerError> {
        let _entered = self.guard.enter()?;
        self.authorize(caller, "set_router")?;

        let new_address = new_router.address();
        let (previous, ordinal) = {
            let mut state = self.state();
            let next = state.router.updates.advance().map_err(|e| {
                tracing::warn!(error = %e, "router update rejected");
                LedgerError::from(e)
            })?;
            new_address.require_non_zero("router")?;

            let previous = state.router.current.address();
            state.router = RouterReference {
                current: new_router,
                updates: next,
            };
            (previous, next.count())
        };

        tracing::info!(%previous, new = %new_address, ordinal, "router updated");
        self.deps.events.publish(LedgerEvent::RouterUpdated {
            previous,
            new: new_address,
            ordinal,
        });
        Ok(ordinal)
    }

    /// Record the current height and swap counter under `epoch_id`.
    ///
    /// Re-sealing an epoch overwrites it; the replaced snapshot is returned
    /// and reported in the event.
    pub fn seal_snapshot(
        &self,
        caller: &Address,
        epoch_id: u64,
    ) -> Result<Option<EpochSnapshot>, LedgerError> {
        let _entered = self.guard.enter()?;
        self.authorize(caller, "seal_snapshot")?;

        let height = self.deps.env.block_height();
        let timestamp = self.deps.env.timestamp();
        let sealed_at = i64::try_from(timestamp)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| {
                tracing::warn!(epoch_id, timestamp, "rejected: block timestamp out of range");
                LedgerError::Internal(format!("block timestamp {} out of range", timestamp))
            })?;

        let (snapshot, replaced) = {
            let mut state = self.state();
            let snapshot = EpochSnapshot {
                epoch_id,
                height,
                swap_count: state.swap_count,
                sealed_at,
            };
            let replaced = state.snapshots.insert(epoch_id, snapshot.clone());
            (snapshot, replaced)
        };

        if let Some(ref old) = replaced {
            tracing::warn!(
                epoch_id,
                old_swap_count = old.swap_count,
                new_swap_count = snapshot.swap_count,
                "epoch snapshot overwritten"
            );
        }
        tracing::info!(epoch_id, height, swap_count = snapshot.swap_count, "snapshot sealed");
        self.deps.events.publish(LedgerEvent::SnapshotSealed {
            snapshot,
            replaced: replaced.clone(),
        });
        Ok(replaced)
    }

    /// Set the pause flag gating all trading calls.
    pub fn set_paused(&self, caller: &Address, paused: bool) -> Result<(), LedgerError> {
        let _entered = self.guard.enter()?;
        self.authorize(caller, "set_paused")?;

        self.state().paused = paused;
        tracing::info!(paused, "pause flag set");
        self.deps.events.publish(LedgerEvent::PauseChanged { paused });
        Ok(())
    }
}

fn checked_total(
    total: TokenAmount,
    add: TokenAmount,
    what: &'static str,
) -> Result<TokenAmount, LedgerError> {
    total
        .checked_add(add)
        .ok_or_else(|| CoreError::Overflow(what).into())
}
