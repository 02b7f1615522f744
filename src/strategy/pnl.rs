//! Terminal-price payoff evaluation
//!
//! Strikes `K_1 < ... < K_n` cut the price axis into `n + 1` intervals
//! `(K_j, K_{j+1}]`. Every order resolves the same way anywhere inside one
//! interval, so the payoff table has one row per interval and is built in a
//! single pass over the strikes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::strategy::types::{OrderRecommendation, OrderSide, Strike};

/// Units held on one outcome token of one strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exposure {
    pub strike_price_level: Decimal,
    pub side: OrderSide,
    pub units: u64,
}

impl From<&OrderRecommendation> for Exposure {
    fn from(order: &OrderRecommendation) -> Self {
        Self {
            strike_price_level: order.strike_price_level,
            side: order.side,
            units: order.units,
        }
    }
}

/// Payoff when the terminal price lands in `(lower, upper]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalOutcome {
    /// Exclusive lower bound; `None` is unbounded below
    pub lower: Option<Decimal>,
    /// Inclusive upper bound; `None` is unbounded above
    pub upper: Option<Decimal>,
    /// Units paying out in this interval
    pub payout: Decimal,
    /// `payout - total_cost`
    pub net: Decimal,
    /// Normalized probability implied by the quotes
    pub probability: Decimal,
}

/// Payoff table and its aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnlProfile {
    pub intervals: Vec<IntervalOutcome>,
    /// `max(0, -min(net))`
    pub worst_case_loss: Decimal,
    /// `max(net)`
    pub max_profit: Decimal,
    /// Probability-weighted net payoff
    pub expected_value: Decimal,
}

impl PnlProfile {
    /// Evaluate `exposures` over the intervals cut by `strikes`
    ///
    /// `strikes` must be sorted ascending with distinct levels. Exposures on a
    /// level not present in `strikes` are ignored.
    pub fn evaluate(strikes: &[Strike], exposures: &[Exposure], total_cost: Decimal) -> Self {
        let n = strikes.len();
        let mut yes_units = vec![Decimal::ZERO; n];
        let mut no_units = vec![Decimal::ZERO; n];

        for exposure in exposures {
            match strikes.binary_search_by(|s| s.price_level.cmp(&exposure.strike_price_level)) {
                Ok(idx) => {
                    let units = Decimal::from(exposure.units);
                    match exposure.side {
                        OrderSide::Yes => yes_units[idx] += units,
                        OrderSide::No => no_units[idx] += units,
                    }
                }
                Err(_) => debug!(
                    level = %exposure.strike_price_level,
                    "Ignoring exposure on unknown strike"
                ),
            }
        }

        let probabilities = interval_probabilities(strikes);

        // Below every strike only the NO legs pay out.
        let mut payout: Decimal = no_units.iter().copied().sum();
        let mut intervals = Vec::with_capacity(n + 1);

        for j in 0..=n {
            if j > 0 {
                // Crossing K_j: its YES leg starts paying, its NO leg stops.
                payout += yes_units[j - 1] - no_units[j - 1];
            }
            intervals.push(IntervalOutcome {
                lower: j.checked_sub(1).map(|i| strikes[i].price_level),
                upper: strikes.get(j).map(|s| s.price_level),
                payout,
                net: payout - total_cost,
                probability: probabilities[j],
            });
        }

        let worst_net = intervals
            .iter()
            .map(|i| i.net)
            .min()
            .unwrap_or(Decimal::ZERO);
        let max_profit = intervals
            .iter()
            .map(|i| i.net)
            .max()
            .unwrap_or(Decimal::ZERO);
        let expected_value = intervals.iter().map(|i| i.probability * i.net).sum();

        Self {
            intervals,
            worst_case_loss: (-worst_net).max(Decimal::ZERO),
            max_profit,
            expected_value,
        }
    }

    /// Outcome when the price finishes below every strike
    pub fn downside_only(&self) -> Option<&IntervalOutcome> {
        self.intervals.first()
    }

    /// Outcome when the price finishes above every strike
    pub fn upside_only(&self) -> Option<&IntervalOutcome> {
        self.intervals.last()
    }
}

/// Probability of each terminal interval implied by the quotes
///
/// `q_0 = NO(K_1)`, `q_j = YES(K_j) - YES(K_{j+1})`, `q_n = YES(K_n)`.
/// Negative differences are clamped to zero and the result is normalized to
/// sum to one; a ladder with no usable mass falls back to a uniform split.
pub fn interval_probabilities(strikes: &[Strike]) -> Vec<Decimal> {
    let n = strikes.len();
    if n == 0 {
        return vec![Decimal::ONE];
    }

    let mut raw = Vec::with_capacity(n + 1);
    raw.push(strikes[0].no_price);
    for pair in strikes.windows(2) {
        raw.push(pair[0].yes_price - pair[1].yes_price);
    }
    raw.push(strikes[n - 1].yes_price);

    let clamped: Vec<Decimal> = raw.into_iter().map(|p| p.max(Decimal::ZERO)).collect();
    let total: Decimal = clamped.iter().copied().sum();

    if total <= Decimal::ZERO {
        let uniform = Decimal::ONE / Decimal::from(n + 1);
        return vec![uniform; n + 1];
    }

    clamped.into_iter().map(|p| p / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn ladder() -> Vec<Strike> {
        vec![
            Strike::new(dec!(80), dec!(0.85), dec!(0.15)),
            Strike::new(dec!(90), dec!(0.70), dec!(0.30)),
            Strike::new(dec!(110), dec!(0.30), dec!(0.70)),
            Strike::new(dec!(120), dec!(0.15), dec!(0.85)),
        ]
    }

    #[test]
    fn test_interval_probabilities_from_consistent_ladder() {
        let probs = interval_probabilities(&ladder());
        assert_eq!(
            probs,
            vec![dec!(0.15), dec!(0.15), dec!(0.40), dec!(0.15), dec!(0.15)]
        );
    }

    #[test]
    fn test_interval_probabilities_normalize_inverted_quotes() {
        // YES rises with the strike, so the middle interval clamps to zero.
        let strikes = vec![
            Strike::from_yes(dec!(90), dec!(0.3)),
            Strike::from_yes(dec!(110), dec!(0.7)),
        ];
        let probs = interval_probabilities(&strikes);
        assert_eq!(probs[1], dec!(0));
        assert_eq!(probs.iter().copied().sum::<Decimal>(), dec!(1));
    }

    #[test]
    fn test_interval_probabilities_without_strikes() {
        assert_eq!(interval_probabilities(&[]), vec![dec!(1)]);
    }

    #[test]
    fn test_collar_payoff() {
        let strikes = ladder();
        let exposures = vec![
            Exposure {
                strike_price_level: dec!(90),
                side: OrderSide::Yes,
                units: 100,
            },
            Exposure {
                strike_price_level: dec!(110),
                side: OrderSide::No,
                units: 100,
            },
        ];
        // 100 * 0.70 + 100 * 0.70
        let profile = PnlProfile::evaluate(&strikes, &exposures, dec!(140));

        let payouts: Vec<Decimal> = profile.intervals.iter().map(|i| i.payout).collect();
        assert_eq!(payouts, vec![dec!(100), dec!(100), dec!(200), dec!(100), dec!(100)]);
        assert_eq!(profile.worst_case_loss, dec!(40));
        assert_eq!(profile.max_profit, dec!(60));
        // 0.6 * -40 + 0.4 * 60
        assert_eq!(profile.expected_value, dec!(0));

        assert_eq!(profile.downside_only().unwrap().upper, Some(dec!(80)));
        assert_eq!(profile.upside_only().unwrap().lower, Some(dec!(120)));
    }

    #[test]
    fn test_guaranteed_profit_has_zero_loss() {
        let strikes = ladder();
        let exposures = vec![
            Exposure {
                strike_price_level: dec!(90),
                side: OrderSide::Yes,
                units: 10,
            },
            Exposure {
                strike_price_level: dec!(110),
                side: OrderSide::No,
                units: 10,
            },
        ];
        let profile = PnlProfile::evaluate(&strikes, &exposures, dec!(6));
        assert_eq!(profile.worst_case_loss, dec!(0));
        assert_eq!(profile.max_profit, dec!(14));
    }

    #[test]
    fn test_unknown_strike_is_ignored() {
        let exposures = vec![Exposure {
            strike_price_level: dec!(95),
            side: OrderSide::Yes,
            units: 10,
        }];
        let profile = PnlProfile::evaluate(&ladder(), &exposures, dec!(0));
        assert!(profile.intervals.iter().all(|i| i.payout == dec!(0)));
    }
}
