//! Ladder Hedge Library
//!
//! Recommends delta-neutral buy orders across the strikes of a crypto price
//! ladder event, anchored at the current spot price.

pub mod binance;
pub mod common;
pub mod config;
pub mod polymarket;
pub mod service;
pub mod strategy;

// Re-export commonly used types
pub use binance::BinanceRestClient;
pub use common::errors::{AllocationError, ClientError, Result};
pub use common::types::{Asset, Event, EventSummary, Market};
pub use config::types::AppConfig;
pub use polymarket::PolymarketWebClient;
pub use service::{AnalysisRequest, LadderAnalysis, SnapshotService};

// Strategy types
pub use strategy::{
    allocate, Allocation, DeltaNeutralPair, MarketSnapshot, OneSidedPolicy, OrderRecommendation,
    OrderSide, PortfolioSummary, StrategyParameters, Strike,
};
