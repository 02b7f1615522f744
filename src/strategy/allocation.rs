//! Delta-neutral ladder allocation
//!
//! Strikes below the anchor are bought YES (a floor), strikes above it are
//! bought NO (a ceiling). Capital is spread within each side by proximity to
//! the anchor, split between sides by the bias, floored to whole units, and
//! then shrunk until the worst-case loss fits under the risk cap.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::common::errors::AllocationError;
use crate::strategy::apy::apy;
use crate::strategy::fees::{FeeCalculator, FeeSchedule};
use crate::strategy::pnl::{Exposure, PnlProfile};
use crate::strategy::types::{
    Allocation, LadderSide, MarketSnapshot, OneSidedPolicy, OrderRecommendation,
    PortfolioSummary, StrategyParameters, Strike,
};

/// Decimal places kept on expected value and APY in the summary
const SUMMARY_DP: u32 = 6;

/// A strike with the side it was assigned to and its running unit count
#[derive(Debug, Clone)]
struct Leg {
    strike: Strike,
    /// Position of the strike in the normalized ladder
    index: usize,
    side: LadderSide,
    distance: Decimal,
    unit_cost: Decimal,
    /// Units bought per unit of capital at full scale
    rate: Decimal,
    units: u64,
}

impl Leg {
    fn cost(&self) -> Decimal {
        Decimal::from(self.units) * self.unit_cost
    }

    fn exposure(&self) -> Exposure {
        Exposure {
            strike_price_level: self.strike.price_level,
            side: self.side.order_side(),
            units: self.units,
        }
    }

    /// Whether this leg pays out when the price lands in interval `j`
    fn pays_in(&self, j: usize) -> bool {
        match self.side {
            LadderSide::Downside => j > self.index,
            LadderSide::Upside => j <= self.index,
        }
    }
}

/// Recommend buy orders that hedge a ladder event around its anchor
///
/// Pure and deterministic: identical inputs give identical output, and on
/// failure nothing is returned but the error.
///
/// # Errors
/// * `InvalidParameter` - parameters out of range, non-positive anchor, or a
///   budget too small to buy a single unit or too large to count in `u64`
/// * `InsufficientData` - no strikes, or none with a positive level and quotes inside (0, 1)
/// * `AsymmetricMarket` - all strikes on one side of the anchor under `OneSidedPolicy::Reject`
/// * `RiskCapUnsatisfiable` - only an empty position keeps the worst-case loss under the cap
pub fn allocate(
    snapshot: &MarketSnapshot,
    params: &StrategyParameters,
) -> Result<Allocation, AllocationError> {
    params.validate()?;

    if snapshot.anchor <= Decimal::ZERO {
        return Err(AllocationError::InvalidParameter(format!(
            "anchor price must be positive, got {}",
            snapshot.anchor
        )));
    }
    if snapshot.strikes.is_empty() {
        return Err(AllocationError::InsufficientData(
            "snapshot has no strikes".to_string(),
        ));
    }

    let strikes = normalize_strikes(&snapshot.strikes);
    if strikes.is_empty() {
        return Err(AllocationError::InsufficientData(
            "no strike has a positive level and quotes inside (0, 1)".to_string(),
        ));
    }

    let fees = FeeSchedule::from_params(params);
    let mut legs = build_legs(&strikes, snapshot.anchor, &fees);

    let has_downside = legs.iter().any(|l| l.side == LadderSide::Downside);
    let has_upside = legs.iter().any(|l| l.side == LadderSide::Upside);
    if !(has_downside && has_upside) && params.one_sided == OneSidedPolicy::Reject {
        return Err(AllocationError::AsymmetricMarket(format!(
            "all {} strikes lie {} the anchor {}",
            strikes.len(),
            if has_downside { "at or below" } else { "above" },
            snapshot.anchor
        )));
    }

    let (downside_fraction, upside_fraction) = split_budget(params, has_downside, has_upside);
    debug!(
        anchor = %snapshot.anchor,
        strikes = strikes.len(),
        %downside_fraction,
        %upside_fraction,
        "Allocating ladder"
    );

    assign_rates(&mut legs, LadderSide::Downside, downside_fraction, params.beta);
    assign_rates(&mut legs, LadderSide::Upside, upside_fraction, params.beta);

    fill(&mut legs, params.budget)?;
    if legs.iter().all(|l| l.units == 0) {
        return Err(AllocationError::InvalidParameter(format!(
            "budget {} cannot buy a single unit at any strike",
            params.budget
        )));
    }

    let pnl = fit_within_limits(&strikes, &mut legs, params.budget, params.risk_cap)?;

    Ok(build_allocation(legs, pnl, params, &fees))
}

/// Merge duplicate levels, drop untradeable strikes, and sort ascending
fn normalize_strikes(strikes: &[Strike]) -> Vec<Strike> {
    let mut sorted: Vec<Strike> = strikes.to_vec();
    sorted.sort_by(|a, b| a.price_level.cmp(&b.price_level));

    let mut merged: Vec<Strike> = Vec::with_capacity(sorted.len());
    let mut group: Vec<Strike> = Vec::new();

    for strike in sorted {
        if group
            .first()
            .is_some_and(|g| g.price_level != strike.price_level)
        {
            merged.push(average(&group));
            group.clear();
        }
        group.push(strike);
    }
    if !group.is_empty() {
        merged.push(average(&group));
    }

    merged
        .into_iter()
        .filter(|s| {
            let keep = s.is_tradeable();
            if !keep {
                debug!(level = %s.price_level, "Dropping untradeable strike");
            }
            keep
        })
        .collect()
}

fn average(group: &[Strike]) -> Strike {
    let count = Decimal::from(group.len());
    let yes: Decimal = group.iter().map(|s| s.yes_price).sum();
    let no: Decimal = group.iter().map(|s| s.no_price).sum();
    Strike::new(group[0].price_level, yes / count, no / count)
}

/// Assign each strike to a side of the anchor
///
/// Downside legs come nearest-first, then upside legs nearest-first. A strike
/// exactly at the anchor is bought YES on the downside.
fn build_legs(strikes: &[Strike], anchor: Decimal, fees: &FeeSchedule) -> Vec<Leg> {
    let hundred = Decimal::from(100);
    let mut legs: Vec<Leg> = strikes
        .iter()
        .enumerate()
        .map(|(index, strike)| {
            let side = if strike.price_level <= anchor {
                LadderSide::Downside
            } else {
                LadderSide::Upside
            };
            let quote = strike.quote(side.order_side());
            Leg {
                strike: strike.clone(),
                index,
                side,
                distance: (strike.price_level - anchor).abs() / anchor * hundred,
                unit_cost: fees.unit_cost(quote),
                rate: Decimal::ZERO,
                units: 0,
            }
        })
        .collect();

    // Stable sort keeps ascending level order among equal distances.
    legs.sort_by(|a, b| {
        let rank = |l: &Leg| match l.side {
            LadderSide::Downside => 0,
            LadderSide::Upside => 1,
        };
        rank(a).cmp(&rank(b)).then(a.distance.cmp(&b.distance))
    });
    legs
}

/// `(downside, upside)` fractions of the budget after applying the bias
fn split_budget(params: &StrategyParameters, has_downside: bool, has_upside: bool) -> (Decimal, Decimal) {
    match (has_downside, has_upside) {
        (true, false) => (Decimal::ONE, Decimal::ZERO),
        (false, true) => (Decimal::ZERO, Decimal::ONE),
        _ => {
            let alpha = (params.bias + Decimal::ONE) / Decimal::TWO;
            (Decimal::ONE - alpha, alpha)
        }
    }
}

/// Units per unit of capital for each leg of one side
///
/// Weight is `beta / (beta + d)` with `d` the percent distance to the anchor,
/// normalized within the side and scaled by the side's budget fraction.
fn assign_rates(legs: &mut [Leg], side: LadderSide, fraction: Decimal, beta: Decimal) {
    if fraction <= Decimal::ZERO {
        return;
    }

    let weights: Vec<(usize, Decimal)> = legs
        .iter()
        .enumerate()
        .filter(|(_, l)| l.side == side)
        .map(|(i, l)| (i, beta / (beta + l.distance)))
        .collect();
    let total: Decimal = weights.iter().map(|(_, w)| *w).sum();
    if total <= Decimal::ZERO {
        return;
    }

    for (idx, weight) in weights {
        let leg = &mut legs[idx];
        leg.rate = fraction * weight / total / leg.unit_cost;
    }
}

/// Set every leg to `floor(scale * rate)` units
fn fill(legs: &mut [Leg], scale: Decimal) -> Result<(), AllocationError> {
    for leg in legs.iter_mut() {
        leg.units = scale
            .checked_mul(leg.rate)
            .and_then(|units| units.floor().to_u64())
            .ok_or_else(|| {
                AllocationError::InvalidParameter(format!(
                    "budget {} buys more units at {} than can be counted",
                    scale, leg.strike.price_level
                ))
            })?;
    }
    Ok(())
}

/// Worst-case loss of the unrounded position per unit of capital
///
/// Payoffs and costs are both linear in the scale, so the unrounded loss at
/// scale `s` is `s` times this value.
fn loss_per_unit_scale(strikes: &[Strike], legs: &[Leg]) -> Decimal {
    let cost: Decimal = legs.iter().map(|l| l.rate * l.unit_cost).sum();
    let worst_net = (0..=strikes.len())
        .map(|j| {
            let payout: Decimal = legs.iter().filter(|l| l.pays_in(j)).map(|l| l.rate).sum();
            payout - cost
        })
        .min()
        .unwrap_or(Decimal::ZERO);
    (-worst_net).max(Decimal::ZERO)
}

/// Drop the units bought last as the scale grows
///
/// A leg gains its `k`-th unit at scale `k / rate`; the legs whose current
/// count was reached at the highest scale give one unit back.
fn step_down(legs: &mut [Leg]) {
    let latest = legs
        .iter()
        .filter(|l| l.units > 0 && l.rate > Decimal::ZERO)
        .map(|l| Decimal::from(l.units) / l.rate)
        .max();
    let Some(latest) = latest else {
        return;
    };
    for leg in legs.iter_mut() {
        if leg.units > 0 && leg.rate > Decimal::ZERO && Decimal::from(leg.units) / leg.rate == latest {
            leg.units -= 1;
        }
    }
}

/// Shrink the position along its scaling path until it fits the budget and
/// the risk cap
///
/// The scale first drops to `risk_cap / loss_per_unit_scale` when the
/// unrounded loss at full budget is over the cap. Units then walk back one
/// breakpoint at a time. The walk does not depend on the budget, so a larger
/// budget never ends with fewer units at any strike.
fn fit_within_limits(
    strikes: &[Strike],
    legs: &mut [Leg],
    budget: Decimal,
    risk_cap: Decimal,
) -> Result<PnlProfile, AllocationError> {
    let unit_loss = loss_per_unit_scale(strikes, legs);
    if unit_loss > Decimal::ZERO {
        if let Some(cap_scale) = risk_cap.checked_div(unit_loss) {
            if cap_scale < budget {
                debug!(%unit_loss, %risk_cap, scale = %cap_scale, "Risk cap binds, rescaling");
                fill(legs, cap_scale)?;
            }
        }
    }

    let mut steps = 0u64;
    loop {
        let total_cost: Decimal = legs.iter().map(Leg::cost).sum();
        let exposures: Vec<Exposure> = legs.iter().map(Leg::exposure).collect();
        let profile = PnlProfile::evaluate(strikes, &exposures, total_cost);

        if total_cost <= budget && profile.worst_case_loss <= risk_cap {
            if steps > 0 {
                debug!(steps, worst_case_loss = %profile.worst_case_loss, "Stepped down to fit limits");
            }
            if legs.iter().all(|l| l.units == 0) {
                return Err(AllocationError::RiskCapUnsatisfiable(format!(
                    "every non-zero allocation has a worst-case loss above the cap {}",
                    risk_cap
                )));
            }
            return Ok(profile);
        }

        step_down(legs);
        steps += 1;
    }
}

fn build_allocation(
    legs: Vec<Leg>,
    pnl: PnlProfile,
    params: &StrategyParameters,
    fees: &FeeSchedule,
) -> Allocation {
    let mut ranked: Vec<&Leg> = legs.iter().filter(|l| l.units > 0).collect();
    ranked.sort_by(|a, b| a.distance.cmp(&b.distance));

    let orders: Vec<OrderRecommendation> = ranked
        .iter()
        .map(|leg| {
            let side = leg.side.order_side();
            OrderRecommendation {
                strike_price_level: leg.strike.price_level,
                side,
                units: leg.units,
                unit_cost: leg.unit_cost,
                total_cost: leg.cost(),
                limit_price: fees.limit_price(leg.strike.quote(side)),
                max_profit: FeeCalculator::order_max_profit(leg.units, leg.unit_cost),
                max_loss: FeeCalculator::order_max_loss(leg.units, leg.unit_cost),
            }
        })
        .collect();

    let side_cost = |side: LadderSide| -> Decimal {
        ranked
            .iter()
            .filter(|l| l.side == side)
            .map(|l| l.cost())
            .sum()
    };
    let downside_cost = side_cost(LadderSide::Downside);
    let upside_cost = side_cost(LadderSide::Upside);
    let total_cost = downside_cost + upside_cost;

    let neutral = ranked.iter().any(|l| l.side == LadderSide::Downside)
        && ranked.iter().any(|l| l.side == LadderSide::Upside);

    let summary = PortfolioSummary {
        total_cost,
        remaining_budget: params.budget - total_cost,
        worst_case_loss: pnl.worst_case_loss,
        max_profit: pnl.max_profit,
        expected_value: pnl.expected_value.round_dp(SUMMARY_DP),
        apy: apy(pnl.expected_value, total_cost, params.days_to_resolution)
            .map(|a| a.round_dp(SUMMARY_DP)),
        upside_cost,
        downside_cost,
        num_orders: orders.len(),
        neutral,
    };

    debug!(
        orders = summary.num_orders,
        total_cost = %summary.total_cost,
        worst_case_loss = %summary.worst_case_loss,
        neutral,
        "Allocation complete"
    );

    Allocation {
        orders,
        summary,
        pnl,
    }
}
