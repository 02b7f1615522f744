//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::strategy::{FeeSchedule, OneSidedPolicy, StrategyParameters, DEFAULT_HIGHLIGHT_MIN_PNL};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Binance spot price feed
    #[serde(default)]
    pub binance: BinanceConfig,
    /// Polymarket event pages
    #[serde(default)]
    pub polymarket: PolymarketConfig,
    /// Default allocation parameters
    #[serde(default)]
    pub strategy: StrategyDefaults,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Binance REST configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinanceConfig {
    /// Base URL for the spot REST API
    #[serde(default = "default_binance_rest_url")]
    pub rest_url: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            rest_url: default_binance_rest_url(),
        }
    }
}

fn default_binance_rest_url() -> String {
    "https://api.binance.com/api/v3".to_string()
}

/// Polymarket website configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolymarketConfig {
    /// Base URL of the website serving event pages
    #[serde(default = "default_polymarket_base_url")]
    pub base_url: String,
    /// User agent sent with page requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum search result pages followed per query
    #[serde(default = "default_max_search_pages")]
    pub max_search_pages: u32,
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_polymarket_base_url(),
            user_agent: default_user_agent(),
            max_search_pages: default_max_search_pages(),
        }
    }
}

fn default_polymarket_base_url() -> String {
    "https://polymarket.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_max_search_pages() -> u32 {
    3
}

/// Allocation parameters used when the CLI does not override them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDefaults {
    #[serde(default = "default_budget")]
    pub budget: Decimal,
    /// Defaults to the budget when unset
    #[serde(default)]
    pub risk_cap: Option<Decimal>,
    #[serde(default)]
    pub bias: Decimal,
    #[serde(default = "default_fee_rate")]
    pub fee_rate: Decimal,
    #[serde(default = "default_slippage")]
    pub slippage: Decimal,
    #[serde(default = "default_beta")]
    pub beta: Decimal,
    /// Used when the event page carries no end date
    #[serde(default = "default_days_to_resolution")]
    pub default_days_to_resolution: Decimal,
    #[serde(default)]
    pub allow_one_sided: bool,
    /// Pair profit at which a strike past the nearest one is highlighted
    #[serde(default = "default_highlight_min_pnl")]
    pub highlight_min_pnl: Decimal,
}

impl Default for StrategyDefaults {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            risk_cap: None,
            bias: Decimal::ZERO,
            fee_rate: default_fee_rate(),
            slippage: default_slippage(),
            beta: default_beta(),
            default_days_to_resolution: default_days_to_resolution(),
            allow_one_sided: false,
            highlight_min_pnl: default_highlight_min_pnl(),
        }
    }
}

impl StrategyDefaults {
    /// Engine parameters built from these defaults
    pub fn to_parameters(&self) -> StrategyParameters {
        let policy = if self.allow_one_sided {
            OneSidedPolicy::AllowFlagged
        } else {
            OneSidedPolicy::Reject
        };
        StrategyParameters::new(self.budget)
            .with_risk_cap(self.risk_cap.unwrap_or(self.budget))
            .with_bias(self.bias)
            .with_fees(self.fee_rate, self.slippage)
            .with_beta(self.beta)
            .with_days_to_resolution(self.default_days_to_resolution)
            .with_one_sided(policy)
    }
}

fn default_budget() -> Decimal {
    dec!(1000)
}

fn default_fee_rate() -> Decimal {
    FeeSchedule::polymarket().fee_rate
}

fn default_slippage() -> Decimal {
    FeeSchedule::polymarket().slippage
}

fn default_beta() -> Decimal {
    dec!(2)
}

fn default_days_to_resolution() -> Decimal {
    dec!(7)
}

fn default_highlight_min_pnl() -> Decimal {
    DEFAULT_HIGHLIGHT_MIN_PNL
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
