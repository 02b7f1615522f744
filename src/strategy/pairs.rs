//! Two-leg hedges across neighbouring strikes
//!
//! A pair holds the NO at one strike and the YES at its neighbour further
//! from the anchor. On the downside the two legs overlap and at least one
//! always pays; on the upside they leave the gap between the strikes
//! uncovered. Pairs are ranked by the profit of a single paying leg and the
//! ones past the first strike on each side can be flagged for attention.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::strategy::fees::FeeSchedule;
use crate::strategy::types::{LadderSide, Strike};

/// Profit per pair at which a non-adjacent strike is highlighted
pub const DEFAULT_HIGHLIGHT_MIN_PNL: Decimal = dec!(0.10);

/// Grid points on each side of the anchor in a pair scenario
const GRID_HALF_WIDTH: i64 = 4;

const MIN_GRID_STEP: Decimal = dec!(0.0001);

/// NO at `no_strike` paired with YES at the neighbouring `yes_strike`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaNeutralPair {
    pub direction: LadderSide,
    pub yes_strike: Decimal,
    pub yes_price: Decimal,
    pub no_strike: Decimal,
    pub no_price: Decimal,
    /// Sum of the two quotes
    pub cost: Decimal,
    /// Sum of the two unit costs after fees and slippage
    pub effective_cost: Decimal,
    /// Profit of one pair when exactly one leg pays
    pub pnl: Decimal,
}

/// Pair every strike with its neighbour away from the anchor
///
/// Keyed by the NO strike. A strike at or below the anchor takes the YES of
/// the next lower strike; one above takes the YES of the next higher strike.
/// The outermost strike on each side has no neighbour and gets no pair.
/// Untradeable strikes are skipped.
pub fn delta_neutral_pairs(
    strikes: &[Strike],
    anchor: Decimal,
    fees: &FeeSchedule,
) -> BTreeMap<Decimal, DeltaNeutralPair> {
    let mut ladder: Vec<&Strike> = strikes.iter().filter(|s| s.is_tradeable()).collect();
    ladder.sort_by(|a, b| a.price_level.cmp(&b.price_level));
    ladder.dedup_by(|a, b| a.price_level == b.price_level);

    let mut pairs = BTreeMap::new();
    for (i, no_leg) in ladder.iter().enumerate() {
        let (direction, yes_leg) = if no_leg.price_level <= anchor {
            let Some(lower) = i.checked_sub(1).and_then(|j| ladder.get(j)) else {
                continue;
            };
            (LadderSide::Downside, lower)
        } else {
            let Some(higher) = ladder.get(i + 1) else {
                continue;
            };
            (LadderSide::Upside, higher)
        };

        let effective_cost = fees.unit_cost(yes_leg.yes_price) + fees.unit_cost(no_leg.no_price);
        pairs.insert(
            no_leg.price_level,
            DeltaNeutralPair {
                direction,
                yes_strike: yes_leg.price_level,
                yes_price: yes_leg.yes_price,
                no_strike: no_leg.price_level,
                no_price: no_leg.no_price,
                cost: yes_leg.yes_price + no_leg.no_price,
                effective_cost,
                pnl: Decimal::ONE - effective_cost,
            },
        );
    }
    pairs
}

/// Strikes worth a closer look
///
/// The nearest strike on each side of the anchor is never highlighted; any
/// other strike whose pair earns at least `min_pnl` is.
pub fn highlight_strikes(
    pairs: &BTreeMap<Decimal, DeltaNeutralPair>,
    strikes: &[Strike],
    anchor: Decimal,
    min_pnl: Decimal,
) -> BTreeSet<Decimal> {
    let nearest_below = strikes
        .iter()
        .map(|s| s.price_level)
        .filter(|level| *level <= anchor)
        .max();
    let nearest_above = strikes
        .iter()
        .map(|s| s.price_level)
        .filter(|level| *level > anchor)
        .min();

    pairs
        .iter()
        .filter(|(level, _)| Some(**level) != nearest_below && Some(**level) != nearest_above)
        .filter(|(_, pair)| pair.pnl >= min_pnl)
        .map(|(level, _)| *level)
        .collect()
}

/// Units held in a YES/NO pair and the quotes they were bought at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairPosition {
    pub anchor: Decimal,
    pub yes_strike: Decimal,
    pub yes_price: Decimal,
    pub yes_units: u64,
    pub no_strike: Decimal,
    pub no_price: Decimal,
    pub no_units: u64,
}

/// Value of a pair across a grid of underlying prices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairScenario {
    pub anchor_price: Decimal,
    /// Ascending underlying prices on round steps
    pub prices: Vec<Decimal>,
    /// Index of the grid point nearest the anchor
    pub anchor_index: usize,
    /// Value of one YES unit at each price
    pub yes_values: Vec<Decimal>,
    /// Value of one NO unit at each price
    pub no_values: Vec<Decimal>,
    /// Value of the whole position at each price
    pub position_values: Vec<Decimal>,
    pub invested: Decimal,
}

/// Mark a pair across a price grid around the anchor
///
/// At the grid point nearest the anchor each token is worth its quote. Towards
/// either end of the grid the value moves linearly to what the token settles
/// at on that end, so the outermost points show the payoff at resolution.
pub fn simulate_pair(position: &PairPosition) -> PairScenario {
    let reach = (position.yes_strike - position.anchor)
        .abs()
        .max((position.no_strike - position.anchor).abs());
    let raw_step = if reach > Decimal::ZERO {
        reach / Decimal::from(GRID_HALF_WIDTH)
    } else {
        position.anchor / Decimal::ONE_HUNDRED
    };
    let step = grid_step(raw_step);
    let center = (position.anchor / step)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * step;

    let prices: Vec<Decimal> = (-GRID_HALF_WIDTH..=GRID_HALF_WIDTH)
        .map(|k| center + step * Decimal::from(k))
        .filter(|p| *p > Decimal::ZERO)
        .collect();
    let anchor_index = prices.iter().position(|p| *p == center).unwrap_or(0);

    let yes_settles = |price: Decimal| -> Decimal {
        if price > position.yes_strike {
            Decimal::ONE
        } else {
            Decimal::ZERO
        }
    };
    let no_settles = |price: Decimal| -> Decimal {
        if price <= position.no_strike {
            Decimal::ONE
        } else {
            Decimal::ZERO
        }
    };

    let mark = |quote: Decimal, settle: &dyn Fn(Decimal) -> Decimal, i: usize| -> Decimal {
        let edge = if i > anchor_index {
            prices[prices.len() - 1]
        } else if i < anchor_index {
            prices[0]
        } else {
            return quote;
        };
        let progress = (prices[i] - prices[anchor_index]) / (edge - prices[anchor_index]);
        quote + (settle(edge) - quote) * progress
    };

    let yes_values: Vec<Decimal> = (0..prices.len())
        .map(|i| mark(position.yes_price, &yes_settles, i))
        .collect();
    let no_values: Vec<Decimal> = (0..prices.len())
        .map(|i| mark(position.no_price, &no_settles, i))
        .collect();

    let yes_units = Decimal::from(position.yes_units);
    let no_units = Decimal::from(position.no_units);
    let position_values = yes_values
        .iter()
        .zip(&no_values)
        .map(|(yes, no)| yes_units * yes + no_units * no)
        .collect();

    PairScenario {
        anchor_price: position.anchor,
        prices,
        anchor_index,
        yes_values,
        no_values,
        position_values,
        invested: yes_units * position.yes_price + no_units * position.no_price,
    }
}

/// Smallest 1, 2 or 5 times a power of ten that is at least `raw`
fn grid_step(raw: Decimal) -> Decimal {
    let raw = raw.max(MIN_GRID_STEP);
    let mut magnitude = MIN_GRID_STEP;
    loop {
        for multiple in [Decimal::ONE, Decimal::TWO, dec!(5)] {
            let step = magnitude * multiple;
            if step >= raw {
                return step;
            }
        }
        match magnitude.checked_mul(Decimal::TEN) {
            Some(next) => magnitude = next,
            None => return raw,
        }
    }
}
