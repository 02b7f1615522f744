//! Unified types shared by the market data collaborators

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::errors::ClientError;

/// Underlying crypto asset of a ladder event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    Btc,
    Eth,
    Sol,
    Xrp,
}

impl Asset {
    /// All supported assets in display order
    pub const ALL: [Asset; 4] = [Asset::Btc, Asset::Eth, Asset::Sol, Asset::Xrp];

    /// Binance spot trading pair quoted in USDT
    pub fn binance_symbol(&self) -> &'static str {
        match self {
            Asset::Btc => "BTCUSDT",
            Asset::Eth => "ETHUSDT",
            Asset::Sol => "SOLUSDT",
            Asset::Xrp => "XRPUSDT",
        }
    }

    /// Free-text search terms used when no series page resolves
    pub fn search_queries(&self) -> &'static [&'static str] {
        match self {
            Asset::Btc => &["bitcoin"],
            Asset::Eth => &["ethereum"],
            Asset::Sol => &["solana"],
            Asset::Xrp => &["ripple", "xrp"],
        }
    }

    /// Names the asset goes by in titles and slugs
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Asset::Btc => &["bitcoin", "btc"],
            Asset::Eth => &["ethereum", "eth"],
            Asset::Sol => &["solana", "sol"],
            Asset::Xrp => &["ripple", "xrp"],
        }
    }

    /// Tag labels Polymarket attaches to the asset's events
    pub fn tag_labels(&self) -> &'static [&'static str] {
        match self {
            Asset::Btc => &["bitcoin"],
            Asset::Eth => &["ethereum"],
            Asset::Sol => &["solana"],
            Asset::Xrp => &["ripple", "xrp"],
        }
    }

    /// Recurring ladder series for the asset
    pub fn series_slugs(&self) -> &'static [&'static str] {
        match self {
            Asset::Btc => &[
                "btc-multi-strikes-weekly",
                "bitcoin-neg-risk-weekly",
                "btc-monthly-prices",
            ],
            Asset::Eth => &[
                "ethereum-multi-strikes-weekly",
                "ethereum-neg-risk-weekly",
                "eth-monthly-prices",
            ],
            Asset::Sol => &[
                "solana-multi-strikes-weekly",
                "solana-neg-risk-weekly",
                "solana-monthly-prices",
            ],
            Asset::Xrp => &[
                "xrp-multi-strikes-weekly",
                "xrp-neg-risk-weekly",
                "xrp-monthly-prices",
            ],
        }
    }

    /// Sort rank used when listing events
    pub fn rank(&self) -> usize {
        Self::ALL.iter().position(|a| a == self).unwrap_or(Self::ALL.len())
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Asset::Btc => write!(f, "BTC"),
            Asset::Eth => write!(f, "ETH"),
            Asset::Sol => write!(f, "SOL"),
            Asset::Xrp => write!(f, "XRP"),
        }
    }
}

impl FromStr for Asset {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BTC" => Ok(Asset::Btc),
            "ETH" => Ok(Asset::Eth),
            "SOL" => Ok(Asset::Sol),
            "XRP" => Ok(Asset::Xrp),
            other => Err(ClientError::Configuration(format!("Unsupported asset: {}", other))),
        }
    }
}

/// Strike level parsed from a market question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeMeta {
    /// Text fragment the strike was read from
    pub raw: String,
    /// Strike level in USD
    pub value: Decimal,
    /// Unit hint ("USD" or "KUSD")
    pub unit: String,
}

/// A single binary market of a ladder event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Market identifier
    pub id: String,
    /// Market question text
    pub question: String,
    /// Strike parsed from the question, if any
    pub strike: Option<StrikeMeta>,
    /// YES outcome price (0.00 to 1.00)
    pub yes_price: Decimal,
    /// NO outcome price (0.00 to 1.00)
    pub no_price: Decimal,
    /// Quoted bid/ask spread
    pub spread: Decimal,
    /// Liquidity, when reported
    pub liquidity: Option<Decimal>,
    /// Market end date as reported by the page
    pub end_date: Option<String>,
}

impl Market {
    /// Strike level in USD when one was parsed and is positive
    pub fn strike_value(&self) -> Option<Decimal> {
        self.strike
            .as_ref()
            .map(|s| s.value)
            .filter(|v| *v > Decimal::ZERO)
    }
}

/// A ladder event with its markets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Event description
    #[serde(default)]
    pub description: String,
    /// URL slug
    pub slug: String,
    /// Open markets of the event
    pub markets: Vec<Market>,
    /// Resolution time as reported by the page
    pub resolve_time: Option<String>,
    /// Tag labels
    #[serde(default)]
    pub tags: Vec<String>,
    /// Series the event belongs to
    pub series_slug: Option<String>,
    /// Traded volume in USD
    pub volume: Option<Decimal>,
}

impl Event {
    /// Parsed resolution time, if the page reported a valid RFC 3339 date
    pub fn resolve_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.resolve_time.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Days until resolution measured from `now`, when positive
    pub fn days_to_resolution(&self, now: DateTime<Utc>) -> Option<Decimal> {
        let seconds = (self.resolve_at()? - now).num_seconds();
        if seconds <= 0 {
            return None;
        }
        Some(Decimal::from(seconds) / Decimal::from(86_400))
    }
}

/// Lightweight event summary for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub title: String,
    pub slug: String,
    pub asset: Asset,
    /// Formatted volume ("$1.2M", "$3.4k", "$950")
    pub volume: Option<String>,
    pub num_markets: usize,
}

/// Format a USD volume the way Polymarket listings show it
pub fn format_volume(volume: Decimal) -> Option<String> {
    if volume <= Decimal::ZERO {
        return None;
    }
    let million = Decimal::from(1_000_000);
    let thousand = Decimal::from(1_000);
    if volume >= million {
        Some(format!("${:.1}M", (volume / million).round_dp(1)))
    } else if volume >= thousand {
        Some(format!("${:.1}k", (volume / thousand).round_dp(1)))
    } else {
        Some(format!("${}", volume.round()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_asset_parsing() {
        assert_eq!("btc".parse::<Asset>().unwrap(), Asset::Btc);
        assert_eq!(" SOL ".parse::<Asset>().unwrap(), Asset::Sol);
        assert!("doge".parse::<Asset>().is_err());
        assert_eq!(Asset::Eth.binance_symbol(), "ETHUSDT");
        assert_eq!(Asset::Xrp.to_string(), "XRP");
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(dec!(2_500_000)), Some("$2.5M".to_string()));
        assert_eq!(format_volume(dec!(3_400)), Some("$3.4k".to_string()));
        assert_eq!(format_volume(dec!(950)), Some("$950".to_string()));
        assert_eq!(format_volume(dec!(0)), None);
    }

    #[test]
    fn test_days_to_resolution() {
        let event = Event {
            id: "1".to_string(),
            title: "t".to_string(),
            description: String::new(),
            slug: "s".to_string(),
            markets: vec![],
            resolve_time: Some("2026-01-08T12:00:00Z".to_string()),
            tags: vec![],
            series_slug: None,
            volume: None,
        };
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(event.days_to_resolution(now), Some(dec!(7)));

        let later = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(event.days_to_resolution(later), None);
    }

    #[test]
    fn test_strike_value_filters_non_positive() {
        let market = Market {
            id: "m".to_string(),
            question: "q".to_string(),
            strike: Some(StrikeMeta {
                raw: "0".to_string(),
                value: Decimal::ZERO,
                unit: "USD".to_string(),
            }),
            yes_price: dec!(0.5),
            no_price: dec!(0.5),
            spread: dec!(0.02),
            liquidity: None,
            end_date: None,
        };
        assert_eq!(market.strike_value(), None);
    }
}
