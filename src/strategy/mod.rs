//! Strategy module for ladder allocation
//!
//! This module holds the only non-trivial decision logic in the crate: a pure,
//! synchronous engine that turns a market snapshot into buy orders.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ASYNC (collaborators)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Binance spot price  ─┐                                     │
//! │                       ├─► MarketSnapshot                    │
//! │  Polymarket event   ──┘                                     │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PURE (sync)                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  allocate(snapshot, params)                                 │
//! │       │  partition → weight → bias split → floor units      │
//! │       ▼                                                     │
//! │  PnlProfile::evaluate   (one row per price interval)        │
//! │       │  shrink until worst-case loss ≤ risk cap            │
//! │       ▼                                                     │
//! │  Allocation { orders, summary, pnl }                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`allocate`]: The allocation engine
//! - [`PnlProfile`]: Per-interval payoff, worst-case loss and expected value
//! - [`apy`]: Annualized return helper
//! - [`FeeSchedule`] / [`FeeCalculator`]: Entry cost and per-order P&L
//! - [`delta_neutral_pairs`] / [`simulate_pair`]: Two-leg hedges across neighbouring strikes
//!
//! # Example
//!
//! ```
//! use ladder_hedge::strategy::{allocate, MarketSnapshot, StrategyParameters, Strike};
//! use rust_decimal_macros::dec;
//!
//! let snapshot = MarketSnapshot::new(
//!     dec!(100),
//!     vec![
//!         Strike::from_yes(dec!(90), dec!(0.3)),
//!         Strike::from_yes(dec!(110), dec!(0.7)),
//!     ],
//! );
//! let params = StrategyParameters::new(dec!(1000)).with_risk_cap(dec!(500));
//!
//! let allocation = allocate(&snapshot, &params).unwrap();
//! assert_eq!(allocation.orders.len(), 2);
//! assert!(allocation.summary.remaining_budget >= dec!(0));
//! ```

mod allocation;
mod apy;
mod fees;
mod pairs;
mod pnl;
mod types;

pub use allocation::allocate;

pub use apy::apy;

pub use fees::{FeeCalculator, FeeSchedule};

pub use pairs::{
    delta_neutral_pairs, highlight_strikes, simulate_pair, DeltaNeutralPair, PairPosition,
    PairScenario, DEFAULT_HIGHLIGHT_MIN_PNL,
};

pub use pnl::{interval_probabilities, Exposure, IntervalOutcome, PnlProfile};

pub use types::{
    Allocation,
    LadderSide,
    MarketSnapshot,
    OneSidedPolicy,
    OrderRecommendation,
    OrderSide,
    PortfolioSummary,
    StrategyParameters,
    Strike,
};
