//! REST API client for Binance spot prices

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, instrument};

use super::messages::{BinanceErrorResponse, TickerPriceResponse};
use crate::common::errors::{ClientError, Result};
use crate::common::traits::SpotPriceSource;
use crate::common::types::Asset;

/// REST API client for Binance spot tickers
#[derive(Debug, Clone)]
pub struct BinanceRestClient {
    /// HTTP client
    client: Client,
    /// Base URL for the spot API (e.g. `https://api.binance.com/api/v3`)
    base_url: String,
}

impl BinanceRestClient {
    /// Create a new REST client
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the latest price for a trading pair
    ///
    /// # Arguments
    /// * `symbol` - Trading pair symbol (e.g. `BTCUSDT`)
    #[instrument(skip(self))]
    pub async fn get_ticker_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/ticker/price", self.base_url);
        debug!("Fetching ticker price from: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<BinanceErrorResponse>(&body)
                .map(|e| format!("{} ({})", e.msg, e.code))
                .unwrap_or(body);
            return Err(ClientError::InvalidResponse(format!(
                "Binance returned status {}: {}",
                status, detail
            )));
        }

        let ticker: TickerPriceResponse = response.json().await?;
        let price: Decimal = ticker
            .price
            .parse()
            .map_err(|e| ClientError::InvalidResponse(format!("Invalid price: {}", e)))?;

        if price <= Decimal::ZERO {
            return Err(ClientError::InvalidResponse(format!(
                "Non-positive price {} for {}",
                price, ticker.symbol
            )));
        }
        Ok(price)
    }

    /// Get the USDT spot price of a supported asset
    pub async fn get_asset_price(&self, asset: Asset) -> Result<Decimal> {
        self.get_ticker_price(asset.binance_symbol()).await
    }
}

#[async_trait]
impl SpotPriceSource for BinanceRestClient {
    async fn spot_price(&self, asset: Asset) -> Result<Decimal> {
        self.get_asset_price(asset).await
    }

    fn venue_name(&self) -> &'static str {
        "binance"
    }
}
