//! Binance REST response types

use serde::{Deserialize, Serialize};

/// Response from `GET /ticker/price`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerPriceResponse {
    pub symbol: String,
    /// Price as a decimal string
    pub price: String,
}

/// Error body returned by Binance on rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinanceErrorResponse {
    pub code: i64,
    pub msg: String,
}
