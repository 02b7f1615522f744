use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::errors::AllocationError;
use crate::strategy::pnl::PnlProfile;

/// Outcome token bought for a strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    /// Pays out when the terminal price ends above the strike
    Yes,
    /// Pays out when the terminal price ends at or below the strike
    No,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Yes => f.pad("YES"),
            OrderSide::No => f.pad("NO"),
        }
    }
}

/// Which side of the anchor a strike was assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LadderSide {
    /// Strikes at or below the anchor, bought YES as a floor
    Downside,
    /// Strikes above the anchor, bought NO as a ceiling
    Upside,
}

impl std::fmt::Display for LadderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LadderSide::Downside => f.pad("downside"),
            LadderSide::Upside => f.pad("upside"),
        }
    }
}

impl LadderSide {
    /// Outcome token bought on this side of the anchor
    pub fn order_side(&self) -> OrderSide {
        match self {
            LadderSide::Downside => OrderSide::Yes,
            LadderSide::Upside => OrderSide::No,
        }
    }
}

/// One strike of a ladder event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    /// Threshold price of the underlying
    pub price_level: Decimal,
    /// YES quote (0.00 to 1.00)
    pub yes_price: Decimal,
    /// NO quote, supplied independently of the YES quote
    pub no_price: Decimal,
}

impl Strike {
    pub fn new(price_level: Decimal, yes_price: Decimal, no_price: Decimal) -> Self {
        Self {
            price_level,
            yes_price,
            no_price,
        }
    }

    /// Strike with the NO quote mirrored from the YES quote
    pub fn from_yes(price_level: Decimal, yes_price: Decimal) -> Self {
        Self::new(price_level, yes_price, Decimal::ONE - yes_price)
    }

    /// Quote for the given outcome token
    pub fn quote(&self, side: OrderSide) -> Decimal {
        match side {
            OrderSide::Yes => self.yes_price,
            OrderSide::No => self.no_price,
        }
    }

    /// Positive level and both quotes strictly inside (0, 1)
    pub fn is_tradeable(&self) -> bool {
        let in_range = |p: Decimal| p > Decimal::ZERO && p < Decimal::ONE;
        self.price_level > Decimal::ZERO && in_range(self.yes_price) && in_range(self.no_price)
    }
}

/// Spot anchor plus the strikes of one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Current spot price of the underlying
    pub anchor: Decimal,
    /// Strikes, ideally ascending by price level
    pub strikes: Vec<Strike>,
}

impl MarketSnapshot {
    pub fn new(anchor: Decimal, strikes: Vec<Strike>) -> Self {
        Self { anchor, strikes }
    }
}

/// What to do when every strike lies on one side of the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneSidedPolicy {
    /// Fail with `AllocationError::AsymmetricMarket`
    #[default]
    Reject,
    /// Spend the whole budget on the populated side and mark the summary non-neutral
    AllowFlagged,
}

/// User-supplied allocation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyParameters {
    /// Total budget in USD
    pub budget: Decimal,
    /// Maximum acceptable worst-case loss in USD
    pub risk_cap: Decimal,
    /// Directional skew from -1 (all downside) to 1 (all upside)
    pub bias: Decimal,
    /// Fee charged per filled unit, as a fraction of the quote
    pub fee_rate: Decimal,
    /// Slippage allowance, as a fraction of the quote
    pub slippage: Decimal,
    /// Smoothing factor; higher values flatten the allocation across strikes
    pub beta: Decimal,
    /// Days until the event resolves
    pub days_to_resolution: Decimal,
    /// Handling of markets with strikes on one side only
    #[serde(default)]
    pub one_sided: OneSidedPolicy,
}

impl StrategyParameters {
    /// Neutral, fee-free parameters with the risk cap equal to the budget
    pub fn new(budget: Decimal) -> Self {
        Self {
            budget,
            risk_cap: budget,
            bias: Decimal::ZERO,
            fee_rate: Decimal::ZERO,
            slippage: Decimal::ZERO,
            beta: Decimal::ONE,
            days_to_resolution: dec!(7),
            one_sided: OneSidedPolicy::Reject,
        }
    }

    pub fn with_risk_cap(mut self, risk_cap: Decimal) -> Self {
        self.risk_cap = risk_cap;
        self
    }

    pub fn with_bias(mut self, bias: Decimal) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_fees(mut self, fee_rate: Decimal, slippage: Decimal) -> Self {
        self.fee_rate = fee_rate;
        self.slippage = slippage;
        self
    }

    pub fn with_beta(mut self, beta: Decimal) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_days_to_resolution(mut self, days: Decimal) -> Self {
        self.days_to_resolution = days;
        self
    }

    pub fn with_one_sided(mut self, policy: OneSidedPolicy) -> Self {
        self.one_sided = policy;
        self
    }

    /// Range-check every parameter
    pub fn validate(&self) -> Result<(), AllocationError> {
        let invalid = |msg: String| Err(AllocationError::InvalidParameter(msg));

        if self.budget <= Decimal::ZERO {
            return invalid(format!("budget must be positive, got {}", self.budget));
        }
        if self.risk_cap < Decimal::ZERO {
            return invalid(format!("risk cap must not be negative, got {}", self.risk_cap));
        }
        if self.risk_cap > self.budget {
            return invalid(format!(
                "risk cap {} exceeds budget {}",
                self.risk_cap, self.budget
            ));
        }
        if self.bias < -Decimal::ONE || self.bias > Decimal::ONE {
            return invalid(format!("bias must be within [-1, 1], got {}", self.bias));
        }
        if self.fee_rate < Decimal::ZERO || self.fee_rate >= Decimal::ONE {
            return invalid(format!("fee rate must be within [0, 1), got {}", self.fee_rate));
        }
        if self.slippage < Decimal::ZERO || self.slippage >= Decimal::ONE {
            return invalid(format!("slippage must be within [0, 1), got {}", self.slippage));
        }
        if self.beta <= Decimal::ZERO {
            return invalid(format!("beta must be positive, got {}", self.beta));
        }
        if self.days_to_resolution <= Decimal::ZERO {
            return invalid(format!(
                "days to resolution must be positive, got {}",
                self.days_to_resolution
            ));
        }
        Ok(())
    }
}

/// A recommended buy order at one strike
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecommendation {
    /// Strike the order targets
    pub strike_price_level: Decimal,
    pub side: OrderSide,
    pub units: u64,
    /// Cost per unit including fee and slippage
    pub unit_cost: Decimal,
    /// `units * unit_cost`
    pub total_cost: Decimal,
    /// Highest price worth posting (quote plus slippage, capped at 0.99)
    pub limit_price: Decimal,
    /// Profit if this order alone pays out
    pub max_profit: Decimal,
    /// Loss if this order alone expires worthless
    pub max_loss: Decimal,
}

/// Portfolio-level view of a set of recommendations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_cost: Decimal,
    /// `budget - total_cost`, never negative
    pub remaining_budget: Decimal,
    /// Largest loss over all terminal price intervals (0 when every interval profits)
    pub worst_case_loss: Decimal,
    /// Largest profit over all terminal price intervals
    pub max_profit: Decimal,
    /// Probability-weighted net payoff using quotes as probabilities
    pub expected_value: Decimal,
    /// Annualized return; `None` when undefined
    pub apy: Option<Decimal>,
    /// Spend on strikes above the anchor
    pub upside_cost: Decimal,
    /// Spend on strikes below the anchor
    pub downside_cost: Decimal,
    pub num_orders: usize,
    /// False when only one side of the anchor received units
    pub neutral: bool,
}

/// Full engine output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Orders ranked nearest-to-anchor first
    pub orders: Vec<OrderRecommendation>,
    pub summary: PortfolioSummary,
    /// Per-interval payoff table behind the summary
    pub pnl: PnlProfile,
}
