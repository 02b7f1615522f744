//! Behavioral tests for the allocation engine
//!
//! Covers the reference scenarios and the budget, risk cap, neutrality,
//! monotonicity and determinism guarantees of `allocate`.

mod common;

use std::collections::BTreeMap;

use ladder_hedge::strategy::{
    allocate, MarketSnapshot, OneSidedPolicy, OrderSide, StrategyParameters, Strike,
};
use ladder_hedge::AllocationError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{five_strike_ladder, scenario_params, symmetric_ladder, two_strike_snapshot};

fn units_by_level(snapshot: &MarketSnapshot, params: &StrategyParameters) -> BTreeMap<Decimal, u64> {
    let allocation = allocate(snapshot, params).unwrap();
    let mut units: BTreeMap<Decimal, u64> = snapshot
        .strikes
        .iter()
        .map(|s| (s.price_level, 0))
        .collect();
    for order in allocation.orders {
        units.insert(order.strike_price_level, order.units);
    }
    units
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test_log::test]
fn test_balanced_two_strike_ladder() {
    let snapshot = two_strike_snapshot(dec!(0.3), dec!(0.7));
    let allocation = allocate(&snapshot, &scenario_params()).unwrap();

    assert_eq!(allocation.orders.len(), 2);
    let downside = &allocation.orders[0];
    let upside = &allocation.orders[1];
    assert_eq!((downside.strike_price_level, downside.side), (dec!(90), OrderSide::Yes));
    assert_eq!((upside.strike_price_level, upside.side), (dec!(110), OrderSide::No));

    assert_eq!(downside.units, 1666);
    assert_eq!(upside.units, 1666);
    let unit_cost = downside.unit_cost.max(upside.unit_cost);
    assert!((downside.total_cost - upside.total_cost).abs() <= unit_cost);

    let summary = &allocation.summary;
    assert_eq!(summary.total_cost, dec!(999.6));
    assert_eq!(summary.remaining_budget, dec!(0.4));
    assert_eq!(summary.worst_case_loss, dec!(0));
    assert!(summary.neutral);
}

#[test]
fn test_full_upside_bias_leaves_downside_empty() {
    let snapshot = two_strike_snapshot(dec!(0.3), dec!(0.7));
    let params = scenario_params().with_bias(dec!(1));
    let allocation = allocate(&snapshot, &params).unwrap();

    assert_eq!(allocation.orders.len(), 1);
    let order = &allocation.orders[0];
    assert_eq!(order.strike_price_level, dec!(110));
    assert_eq!(order.side, OrderSide::No);
    // 3333 units would lose 999.9 above 110; shrunk under the 500 cap
    assert_eq!(order.units, 1666);

    let summary = &allocation.summary;
    assert_eq!(summary.downside_cost, dec!(0));
    assert!(summary.worst_case_loss <= dec!(500));
    assert!(!summary.neutral);
}

#[test]
fn test_zero_risk_cap_with_overpriced_ladder_is_unsatisfiable() {
    // Outside (90, 110] only one of the two legs pays out
    let snapshot = two_strike_snapshot(dec!(0.7), dec!(0.3));
    let params = scenario_params().with_risk_cap(dec!(0));

    let result = allocate(&snapshot, &params);
    assert!(matches!(result, Err(AllocationError::RiskCapUnsatisfiable(_))));
}

#[test]
fn test_zero_risk_cap_allowed_when_ladder_is_riskless() {
    // Both legs cost 0.3 and every interval pays at least one leg, so 1666 units each never lose
    let snapshot = two_strike_snapshot(dec!(0.3), dec!(0.7));
    let params = scenario_params().with_risk_cap(dec!(0));

    let allocation = allocate(&snapshot, &params).unwrap();
    assert_eq!(allocation.summary.worst_case_loss, dec!(0));
}

#[test]
fn test_empty_strikes_is_insufficient_data() {
    let snapshot = MarketSnapshot::new(dec!(100), vec![]);
    let result = allocate(&snapshot, &scenario_params());
    assert!(matches!(result, Err(AllocationError::InsufficientData(_))));
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_symmetric_ladder_is_neutral() {
    let snapshot = symmetric_ladder();
    let params = StrategyParameters::new(dec!(1000));
    let allocation = allocate(&snapshot, &params).unwrap();

    let below = allocation.pnl.downside_only().unwrap();
    let above = allocation.pnl.upside_only().unwrap();
    let max_unit_cost = allocation
        .orders
        .iter()
        .map(|o| o.unit_cost)
        .max()
        .unwrap();

    assert!((below.net - above.net).abs() <= max_unit_cost);
    assert_eq!(
        allocation.summary.upside_cost,
        allocation.summary.downside_cost
    );
}

#[test]
fn test_budget_is_never_exceeded() {
    let snapshot = symmetric_ladder();
    let budgets = [dec!(10), dec!(99.99), dec!(1000), dec!(12345.67)];
    let fees = [(dec!(0), dec!(0)), (dec!(0.02), dec!(0.005)), (dec!(0.1), dec!(0.05))];
    let biases = [dec!(-0.5), dec!(0), dec!(0.8)];

    for budget in budgets {
        for (fee_rate, slippage) in fees {
            for bias in biases {
                let params = StrategyParameters::new(budget)
                    .with_fees(fee_rate, slippage)
                    .with_bias(bias);
                let summary = allocate(&snapshot, &params).unwrap().summary;

                assert!(summary.total_cost <= budget, "budget {} fee {}", budget, fee_rate);
                assert_eq!(summary.remaining_budget, budget - summary.total_cost);
                assert!(summary.remaining_budget >= dec!(0));
            }
        }
    }
}

#[test]
fn test_risk_cap_is_respected_or_reported() {
    let snapshot = symmetric_ladder();

    for cap in [dec!(0), dec!(25), dec!(50), dec!(100), dec!(200), dec!(400), dec!(1000)] {
        let params = StrategyParameters::new(dec!(1000)).with_risk_cap(cap);
        match allocate(&snapshot, &params) {
            Ok(allocation) => assert!(
                allocation.summary.worst_case_loss <= cap,
                "loss {} over cap {}",
                allocation.summary.worst_case_loss,
                cap
            ),
            Err(AllocationError::RiskCapUnsatisfiable(_)) => {}
            Err(other) => panic!("unexpected error for cap {}: {}", cap, other),
        }
    }
}

#[test]
fn test_binding_risk_cap_shrinks_position() {
    let snapshot = symmetric_ladder();
    let uncapped = allocate(&snapshot, &StrategyParameters::new(dec!(1000))).unwrap();
    let capped = allocate(
        &snapshot,
        &StrategyParameters::new(dec!(1000)).with_risk_cap(dec!(100)),
    )
    .unwrap();

    assert!(uncapped.summary.worst_case_loss > dec!(100));
    assert!(capped.summary.worst_case_loss <= dec!(100));
    assert!(capped.summary.total_cost < uncapped.summary.total_cost);
}

#[test]
fn test_larger_budget_never_reduces_units() {
    let snapshot = symmetric_ladder();
    let budgets = [dec!(100), dec!(250), dec!(500), dec!(1000), dec!(2500), dec!(10000)];

    let mut previous: Option<BTreeMap<Decimal, u64>> = None;
    for budget in budgets {
        let params = StrategyParameters::new(budget).with_fees(dec!(0.02), dec!(0.005));
        let units = units_by_level(&snapshot, &params);
        if let Some(prev) = &previous {
            for (level, count) in &units {
                assert!(
                    *count >= prev[level],
                    "units at {} fell from {} to {} at budget {}",
                    level,
                    prev[level],
                    count,
                    budget
                );
            }
        }
        previous = Some(units);
    }
}

#[test]
fn test_larger_budget_never_reduces_units_under_binding_cap() {
    let snapshot = five_strike_ladder();
    let risk_cap = dec!(100);

    let mut previous: Option<(Decimal, BTreeMap<Decimal, u64>)> = None;
    for step in 0..=414 {
        let budget = dec!(100) + Decimal::from(step * 7);
        let params = StrategyParameters::new(budget)
            .with_risk_cap(risk_cap)
            .with_fees(dec!(0.02), dec!(0.005));
        let units = units_by_level(&snapshot, &params);
        if let Some((prev_budget, prev)) = &previous {
            for (level, count) in &units {
                assert!(
                    *count >= prev[level],
                    "units at {} fell from {} at budget {} to {} at budget {}",
                    level,
                    prev[level],
                    prev_budget,
                    count,
                    budget
                );
            }
        }
        previous = Some((budget, units));
    }

    // The cap binds well before the top of the sweep
    let params = StrategyParameters::new(dec!(2998))
        .with_risk_cap(risk_cap)
        .with_fees(dec!(0.02), dec!(0.005));
    let summary = allocate(&snapshot, &params).unwrap().summary;
    assert!(summary.worst_case_loss <= risk_cap);
    assert!(summary.total_cost < dec!(1000));
}

#[test]
fn test_budget_beyond_countable_units_is_rejected() {
    let budget = Decimal::from_i128_with_scale(10_i128.pow(22), 0);
    let result = allocate(&five_strike_ladder(), &StrategyParameters::new(budget));
    assert!(matches!(result, Err(AllocationError::InvalidParameter(_))));
}

#[test]
fn test_identical_inputs_give_identical_output() {
    let snapshot = symmetric_ladder();
    let params = StrategyParameters::new(dec!(777.77))
        .with_bias(dec!(0.3))
        .with_fees(dec!(0.02), dec!(0.005))
        .with_beta(dec!(4))
        .with_risk_cap(dec!(300));

    let first = allocate(&snapshot, &params);
    let second = allocate(&snapshot, &params);
    assert_eq!(first, second);
}

// ============================================================================
// Fees and One-Sided Markets
// ============================================================================

#[test]
fn test_fees_raise_unit_cost_and_cap_limit_price() {
    let snapshot = MarketSnapshot::new(
        dec!(100),
        vec![
            Strike::from_yes(dec!(90), dec!(0.995)),
            Strike::from_yes(dec!(110), dec!(0.3)),
        ],
    );
    let params = StrategyParameters::new(dec!(1000)).with_fees(dec!(0.02), dec!(0.005));
    let allocation = allocate(&snapshot, &params).unwrap();

    let at_90 = allocation
        .orders
        .iter()
        .find(|o| o.strike_price_level == dec!(90))
        .unwrap();
    assert_eq!(at_90.unit_cost, dec!(1.019875));
    assert_eq!(at_90.limit_price, dec!(0.99));

    let at_110 = allocation
        .orders
        .iter()
        .find(|o| o.strike_price_level == dec!(110))
        .unwrap();
    assert_eq!(at_110.unit_cost, dec!(0.7175));
    assert_eq!(at_110.limit_price, dec!(0.7035));
}

#[test]
fn test_one_sided_market_policy() {
    let snapshot = MarketSnapshot::new(
        dec!(100),
        vec![
            Strike::from_yes(dec!(80), dec!(0.85)),
            Strike::from_yes(dec!(90), dec!(0.7)),
        ],
    );

    let rejected = allocate(&snapshot, &StrategyParameters::new(dec!(1000)));
    assert!(matches!(rejected, Err(AllocationError::AsymmetricMarket(_))));

    let params = StrategyParameters::new(dec!(1000)).with_one_sided(OneSidedPolicy::AllowFlagged);
    let allocation = allocate(&snapshot, &params).unwrap();
    assert!(!allocation.summary.neutral);
    assert!(allocation.orders.iter().all(|o| o.side == OrderSide::Yes));
    assert_eq!(allocation.summary.upside_cost, dec!(0));
    assert!(allocation.summary.total_cost <= dec!(1000));
}
