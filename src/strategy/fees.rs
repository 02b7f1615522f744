use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::strategy::types::{OrderSide, StrategyParameters};

/// Highest limit price worth posting on a binary outcome
const MAX_LIMIT_PRICE: Decimal = dec!(0.99);

/// Entry cost configuration for a buy order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Fee as a fraction of the quote, charged per filled unit
    pub fee_rate: Decimal,
    /// Slippage allowance as a fraction of the quote
    pub slippage: Decimal,
}

impl FeeSchedule {
    pub fn new(fee_rate: Decimal, slippage: Decimal) -> Self {
        Self { fee_rate, slippage }
    }

    /// Polymarket defaults
    /// - 2% fee
    /// - 0.5% slippage allowance
    pub fn polymarket() -> Self {
        Self::new(dec!(0.02), dec!(0.005))
    }

    pub fn from_params(params: &StrategyParameters) -> Self {
        Self::new(params.fee_rate, params.slippage)
    }

    /// Effective cost of one unit bought at `quote`
    ///
    /// `quote * (1 + fee_rate + slippage)`
    pub fn unit_cost(&self, quote: Decimal) -> Decimal {
        quote * (Decimal::ONE + self.fee_rate + self.slippage)
    }

    /// Limit price for an order quoted at `quote`
    pub fn limit_price(&self, quote: Decimal) -> Decimal {
        (quote * (Decimal::ONE + self.slippage)).min(MAX_LIMIT_PRICE)
    }
}

/// Per-order profit and loss helpers
///
/// Each winning unit pays out 1.0; fees are already inside the unit cost.
pub struct FeeCalculator;

impl FeeCalculator {
    /// Profit of an order whose outcome pays out
    ///
    /// # Arguments
    /// * `units` - Filled units
    /// * `unit_cost` - Cost per unit including fees
    pub fn order_max_profit(units: u64, unit_cost: Decimal) -> Decimal {
        Decimal::from(units) * (Decimal::ONE - unit_cost)
    }

    /// Loss of an order whose outcome expires worthless
    pub fn order_max_loss(units: u64, unit_cost: Decimal) -> Decimal {
        Decimal::from(units) * unit_cost
    }

    /// Expected value of one unit under a subjective YES probability
    ///
    /// # Arguments
    /// * `unit_cost` - Cost per unit including fees
    /// * `side` - Outcome token held
    /// * `yes_probability` - Belief that the market resolves YES
    ///
    /// # Returns
    /// `p_win * (1 - unit_cost) - (1 - p_win) * unit_cost`
    pub fn order_expected_value(unit_cost: Decimal, side: OrderSide, yes_probability: Decimal) -> Decimal {
        let p_win = match side {
            OrderSide::Yes => yes_probability,
            OrderSide::No => Decimal::ONE - yes_probability,
        };
        p_win * (Decimal::ONE - unit_cost) - (Decimal::ONE - p_win) * unit_cost
    }
}
