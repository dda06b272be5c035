//! Integration test: single and multi-hop swaps through the ledger.
//!
//! Exercises fee collection, delta-based output accounting and quoting
//! against both a scripted router and a constant-product AMM.

use feeswap_core::{split_fee, Address};
use feeswap_integration_tests::{alice, bob, tka, tkb, tkc, weth, Harness, TRADER_FUNDS};
use feeswap_ledger::adapters::{ConstantProductRouter, RouterBehaviour};
use feeswap_ledger::{IEnvironment, IRouter, IToken, LedgerError, LedgerEvent};

// =========================================================================
// Fee split and delta accounting
// =========================================================================

#[test]
fn test_million_unit_swap_settles_exactly() {
    let (h, router) = Harness::with_scripted(RouterBehaviour::Deliver(998_500));

    let outcome = h
        .ledger
        .execute_exact_in_swap(&alice(), &tka(), &tkb(), 1_000_000, 0, 0)
        .expect("swap should succeed");

    assert_eq!(outcome.amount_out, 998_500);
    assert_eq!(outcome.fee, 1_000);
    assert_eq!(h.balance(&tka(), &h.fee_collector()), 1_000);
    assert_eq!(router.calls()[0].amount_in, 999_000);
    assert_eq!(h.balance(&tka(), &alice()), TRADER_FUNDS - 1_000_000);
    assert_eq!(h.balance(&tkb(), &alice()), TRADER_FUNDS + 998_500);

    let events = h.events.events();
    match &events[..] {
        [LedgerEvent::SwapExecuted(record)] => {
            assert_eq!(record.swap_id, 1);
            assert_eq!(record.trader, alice());
            assert_eq!((record.token_in, record.token_out), (tka(), tkb()));
            assert_eq!(record.amount_in, 1_000_000);
            assert_eq!(record.amount_out, 998_500);
            assert_eq!(record.fee, 1_000);
        }
        other => panic!("unexpected events {:?}", other),
    }
}

#[test]
fn test_amm_swap_conserves_input() {
    let (h, router) = Harness::with_amm();
    let amount = 2_500_000;
    let (reserve_in, _) = router.reserves(&tka(), &weth()).expect("pool exists");

    let outcome = h
        .ledger
        .execute_exact_in_swap(&alice(), &tka(), &weth(), amount, 1, 0)
        .expect("swap should succeed");

    let split = split_fee(amount);
    let (reserve_in_after, _) = router.reserves(&tka(), &weth()).expect("pool exists");
    assert_eq!(outcome.fee, split.fee);
    assert_eq!(reserve_in_after - reserve_in, split.net);
    assert_eq!(h.balance(&tka(), &h.fee_collector()), split.fee);
    assert_eq!(h.balance(&tka(), &h.ledger.address()), 0);
    assert_eq!(h.balance(&weth(), &alice()), TRADER_FUNDS + outcome.amount_out);
}

#[test]
fn test_output_is_observed_not_claimed() {
    let (h, router) = Harness::with_scripted(RouterBehaviour::Deliver(700));
    let outcome = h
        .ledger
        .execute_exact_in_swap(&alice(), &tka(), &tkb(), 10_000, 0, 0)
        .expect("swap should succeed");
    assert_eq!(outcome.amount_out, 700);

    router.set_behaviour(RouterBehaviour::ClaimWithoutDelivery(700));
    let result = h
        .ledger
        .execute_exact_in_swap(&alice(), &tka(), &tkb(), 10_000, 0, 0);
    assert_eq!(
        result,
        Err(LedgerError::SlippageOrTransferOut {
            token: tkb(),
            recipient: alice(),
        })
    );
    assert_eq!(h.ledger.swap_count(), 1);
    assert_eq!(h.balance(&tka(), &h.fee_collector()), 10);
}

#[test]
fn test_router_min_out_enforced() {
    let (h, _router) = Harness::with_amm();
    let quoted = h.ledger.quote_exact_in_net(&tka(), &weth(), 1_000_000);

    let result = h
        .ledger
        .execute_exact_in_swap(&alice(), &tka(), &weth(), 1_000_000, quoted + 1, 0);
    assert!(matches!(result, Err(LedgerError::RouterCallFailed(_))));
    assert_eq!(h.balance(&tka(), &alice()), TRADER_FUNDS);

    let outcome = h
        .ledger
        .execute_exact_in_swap(&alice(), &tka(), &weth(), 1_000_000, quoted, 0)
        .expect("swap at quoted minimum should succeed");
    assert_eq!(outcome.amount_out, quoted);
}

#[test]
fn test_expired_deadline_reverts() {
    let (h, _router) = Harness::with_amm();
    let past = h.chain.timestamp() - 1;
    let result = h
        .ledger
        .execute_exact_in_swap(&alice(), &tka(), &weth(), 1_000, 0, past);
    assert!(matches!(result, Err(LedgerError::RouterCallFailed(ref m)) if m.contains("deadline")));
    assert_eq!(h.balance(&tka(), &h.fee_collector()), 0);
}

#[test]
fn test_no_allowance_survives_any_call() {
    let (h, router) = Harness::with_scripted(RouterBehaviour::Deliver(1));
    let ledger = h.ledger.address();
    let spender = router.address();

    h.ledger
        .execute_exact_in_swap(&alice(), &tka(), &tkb(), 50_000, 0, 0)
        .expect("swap should succeed");
    assert_eq!(h.chain.allowance(&tka(), &ledger, &spender), 0);

    router.set_behaviour(RouterBehaviour::Revert("halted".into()));
    assert!(h
        .ledger
        .execute_exact_in_swap(&alice(), &tka(), &tkb(), 50_000, 0, 0)
        .is_err());
    assert_eq!(h.chain.allowance(&tka(), &ledger, &spender), 0);
    assert_eq!(router.observed_allowances(), vec![49_950, 49_950]);
}

// =========================================================================
// Multi-hop
// =========================================================================

#[test]
fn test_multi_hop_through_amm() {
    let (h, _router) = Harness::with_amm();
    let path = [tka(), weth(), tkb(), tkc()];
    let quoted = h.ledger.quote_exact_in_multi_hop_net(&path, 5_000_000);
    assert!(quoted > 0);

    let outcome = h
        .ledger
        .execute_exact_in_multi_hop(&bob(), &path, 5_000_000, 0, 0)
        .expect("multi-hop should succeed");

    assert_eq!(outcome.amount_out, quoted);
    assert_eq!(outcome.fee, 5_000);
    assert_eq!(h.balance(&tkc(), &bob()), TRADER_FUNDS + quoted);
    match &h.events.events()[..] {
        [LedgerEvent::SwapExecuted(record)] => {
            assert_eq!(record.hops, 3);
            assert_eq!(record.token_out, tkc());
        }
        other => panic!("unexpected events {:?}", other),
    }
}

#[test]
fn test_multi_hop_missing_pool_reverts() {
    let (h, _router) = Harness::with_amm();
    let result = h
        .ledger
        .execute_exact_in_multi_hop(&bob(), &[tka(), tkc()], 1_000, 0, 0);
    assert!(matches!(result, Err(LedgerError::RouterCallFailed(_))));
    assert_eq!(h.balance(&tka(), &bob()), TRADER_FUNDS);
    assert_eq!(h.ledger.swap_count(), 0);
}

#[test]
fn test_multi_hop_rejects_null_hop() {
    let (h, _router) = Harness::with_amm();
    let result = h
        .ledger
        .execute_exact_in_multi_hop(&bob(), &[tka(), Address::ZERO, tkb()], 1_000, 0, 0);
    assert_eq!(result, Err(LedgerError::ZeroAddress("path")));
}

// =========================================================================
// Quotes
// =========================================================================

#[test]
fn test_quote_net_equals_quote_of_net_input() {
    let (h, _router) = Harness::with_amm();
    for amount in [1u128, 10, 999, 1_000, 1_001, 77_777, 10_000_000] {
        let net = split_fee(amount).net;
        assert_eq!(
            h.ledger.quote_exact_in_net(&tka(), &weth(), amount),
            h.ledger.quote_exact_in(&tka(), &weth(), net),
            "amount {}",
            amount
        );
    }
}

#[test]
fn test_quote_matches_router_directly() {
    let (h, router) = Harness::with_amm();
    let direct = router
        .get_amounts_out(123_456, &[tka(), weth()])
        .expect("router quote");
    assert_eq!(h.ledger.quote_exact_in(&tka(), &weth(), 123_456), direct[1]);

    let (reserve_in, reserve_out) = router.reserves(&tka(), &weth()).expect("pool exists");
    assert_eq!(
        Some(h.ledger.quote_exact_in(&tka(), &weth(), 500)),
        ConstantProductRouter::amount_out(500, reserve_in, reserve_out)
    );
}

#[test]
fn test_quote_degenerate_inputs_are_zero() {
    let (h, _router) = Harness::with_amm();
    assert_eq!(h.ledger.quote_exact_in(&tka(), &weth(), 0), 0);
    assert_eq!(h.ledger.quote_exact_in(&Address::ZERO, &weth(), 1_000), 0);
    assert_eq!(h.ledger.quote_exact_in(&tka(), &Address::ZERO, 1_000), 0);
    // No pool between A and C.
    assert_eq!(h.ledger.quote_exact_in(&tka(), &tkc(), 1_000), 0);
    assert_eq!(h.ledger.quote_exact_in_multi_hop(&[tka(); 7], 1_000), 0);
    assert_eq!(h.ledger.quote_exact_in_net(&tka(), &weth(), 0), 0);
}

#[test]
fn test_events_serialize_for_audit() {
    let (h, _router) = Harness::with_scripted(RouterBehaviour::Deliver(998_500));
    h.ledger
        .execute_exact_in_swap(&alice(), &tka(), &tkb(), 1_000_000, 0, 0)
        .expect("swap should succeed");

    let event = h.events.events()[0].clone();
    let json = serde_json::to_value(&event).expect("serialize");
    assert_eq!(json["event"], "swap_executed");
    assert_eq!(json["swap_id"], 1);
    assert_eq!(json["trader"], alice().to_string());
    assert_eq!(json["amount_out"], "998500");

    let line = serde_json::to_string(&event).expect("serialize");
    let back: LedgerEvent = serde_json::from_str(&line).expect("audit record should parse back");
    assert_eq!(back, event);
}
