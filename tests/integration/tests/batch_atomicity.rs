//! Integration test: batch execution is all-or-nothing.
//!
//! A failing leg anywhere in a batch must undo every earlier leg: token
//! movements, pool reserves, fees, swap ids and events.

use feeswap_core::{Address, SwapLeg};
use feeswap_integration_tests::{alice, bob, tka, tkb, tkc, weth, Harness, TRADER_FUNDS};
use feeswap_ledger::adapters::RouterBehaviour;
use feeswap_ledger::{LedgerError, LedgerEvent, RouterError, SwapRequest};

fn leg(token_in: Address, token_out: Address, amount: u128) -> SwapLeg {
    SwapLeg::new(token_in, token_out, amount, 0, 0)
}

// =========================================================================
// Successful batches
// =========================================================================

#[test]
fn test_batch_assigns_consecutive_ids() {
    let (h, _router) = Harness::with_amm();
    let legs = vec![
        leg(tka(), weth(), 1_000_000),
        leg(weth(), tkb(), 300_000),
        leg(tkb(), tkc(), 42_000),
    ];

    let outcome = h
        .ledger
        .execute_exact_in_batch(&alice(), &legs)
        .expect("batch should succeed");

    assert_eq!(h.ledger.swap_count(), 3);
    assert_eq!(outcome.total_fee, 1_000 + 300 + 42);

    match &h.events.events()[..] {
        [LedgerEvent::BatchExecuted {
            trader,
            first_swap_id,
            legs,
            total_in,
            total_out,
            total_fee,
        }] => {
            assert_eq!(*trader, alice());
            assert_eq!(*first_swap_id, 1);
            assert_eq!(*legs, 3);
            assert_eq!(*total_in, 1_342_000);
            assert_eq!(*total_out, outcome.total_out);
            assert_eq!(*total_fee, outcome.total_fee);
        }
        other => panic!("unexpected events {:?}", other),
    }
}

#[test]
fn test_ids_continue_across_single_and_batch() {
    let (h, _router) = Harness::with_scripted(RouterBehaviour::Deliver(10));

    h.ledger
        .execute_exact_in_swap(&alice(), &tka(), &tkb(), 5_000, 0, 0)
        .expect("swap should succeed");
    h.ledger
        .execute_exact_in_batch(&bob(), &[leg(tka(), tkb(), 5_000), leg(tkb(), tka(), 5_000)])
        .expect("batch should succeed");
    h.ledger
        .execute_exact_in_swap(&alice(), &tka(), &tkb(), 5_000, 0, 0)
        .expect("swap should succeed");

    assert_eq!(h.ledger.swap_count(), 4);
    assert_eq!(h.swap_ids(), vec![1, 4]);
    let batch_start = h.events.events().iter().find_map(|e| match e {
        LedgerEvent::BatchExecuted { first_swap_id, .. } => Some(*first_swap_id),
        _ => None,
    });
    assert_eq!(batch_start, Some(2));
}

#[test]
fn test_batch_fees_accumulate_per_token() {
    let (h, _router) = Harness::with_scripted(RouterBehaviour::Deliver(1));
    h.ledger
        .execute_exact_in_batch(
            &alice(),
            &[leg(tka(), tkb(), 2_000_000), leg(tkb(), tka(), 3_000_000), leg(tka(), tkc(), 999)],
        )
        .expect("batch should succeed");

    assert_eq!(h.balance(&tka(), &h.fee_collector()), 2_000);
    assert_eq!(h.balance(&tkb(), &h.fee_collector()), 3_000);
}

// =========================================================================
// Failing batches
// =========================================================================

#[test]
fn test_failed_last_leg_reverts_earlier_legs() {
    let (h, router) = Harness::with_amm();
    let reserves_before = router.reserves(&tka(), &weth());
    let legs = vec![
        leg(tka(), weth(), 1_000_000),
        leg(weth(), tkb(), 1_000_000),
        // No A/C pool.
        leg(tka(), tkc(), 1_000_000),
    ];

    let result = h.ledger.execute_exact_in_batch(&alice(), &legs);

    assert!(matches!(result, Err(LedgerError::RouterCallFailed(_))));
    assert_eq!(router.reserves(&tka(), &weth()), reserves_before);
    for token in [tka(), weth(), tkb(), tkc()] {
        assert_eq!(h.balance(&token, &alice()), TRADER_FUNDS);
        assert_eq!(h.balance(&token, &h.fee_collector()), 0);
    }
    assert_eq!(h.ledger.swap_count(), 0);
    assert!(h.events.is_empty());
    assert_eq!(h.chain.open_checkpoints(), 0);
}

#[test]
fn test_failed_batch_leaves_counter_for_next_call() {
    let (h, _router) = Harness::with_amm();
    h.ledger
        .execute_exact_in_swap(&alice(), &tka(), &weth(), 10_000, 0, 0)
        .expect("swap should succeed");

    let bad = vec![leg(tka(), weth(), 10_000), leg(tka(), weth(), 0)];
    assert_eq!(
        h.ledger.execute_exact_in_batch(&alice(), &bad),
        Err(LedgerError::ZeroAmount)
    );

    h.ledger
        .execute_exact_in_swap(&alice(), &tka(), &weth(), 10_000, 0, 0)
        .expect("swap should succeed");
    assert_eq!(h.swap_ids(), vec![1, 2]);
}

#[test]
fn test_underfunded_leg_reverts_batch() {
    let (h, _router) = Harness::with_scripted(RouterBehaviour::Deliver(5));
    let whole = TRADER_FUNDS;
    let legs = vec![leg(tka(), tkb(), whole / 2), leg(tka(), tkb(), whole)];

    let result = h.ledger.execute_exact_in_batch(&alice(), &legs);

    assert_eq!(
        result,
        Err(LedgerError::TransferInFailed {
            token: tka(),
            from: alice(),
            amount: whole,
        })
    );
    assert_eq!(h.balance(&tka(), &alice()), TRADER_FUNDS);
    assert_eq!(h.balance(&tka(), &h.fee_collector()), 0);
    assert_eq!(h.balance(&tkb(), &alice()), TRADER_FUNDS);
}

#[test]
fn test_router_failure_mid_batch() {
    let (h, router) = Harness::with_scripted(RouterBehaviour::Deliver(5));
    let calls_before = router.calls().len();
    router.set_hook(Box::new(|request: &SwapRequest| {
        if request.amount_in > 10_000 {
            Err(RouterError::Reverted("too large".into()))
        } else {
            Ok(())
        }
    }));

    let legs = vec![leg(tka(), tkb(), 5_000), leg(tka(), tkb(), 50_000)];
    let result = h.ledger.execute_exact_in_batch(&alice(), &legs);

    assert!(matches!(result, Err(LedgerError::RouterCallFailed(ref m)) if m.contains("too large")));
    assert_eq!(router.calls().len(), calls_before + 2);
    assert_eq!(h.balance(&tkb(), &alice()), TRADER_FUNDS);
    assert_eq!(h.ledger.swap_count(), 0);
}
