//! Polymarket page data types
//!
//! Event and search pages embed their React Query cache as `__NEXT_DATA__`.
//! Field types in that payload drift (ids as numbers or strings, prices as
//! arrays or JSON-encoded strings), so loosely typed fields stay as
//! [`serde_json::Value`] and are interpreted by the parser.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Event payload stored under the `/api/event/slug` query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub markets: Vec<MarketData>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, rename = "end_date")]
    pub end_date_snake: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagData>,
    #[serde(default)]
    pub series_slug: Option<String>,
    #[serde(default)]
    pub volume: Option<Value>,
}

/// One market inside an event payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub question: Option<String>,
    /// `["0.35", "0.65"]` or `"[\"0.35\", \"0.65\"]"`
    #[serde(default)]
    pub outcome_prices: Option<Value>,
    #[serde(default)]
    pub spread: Option<Value>,
    #[serde(default)]
    pub liquidity_num: Option<Value>,
    #[serde(default)]
    pub liquidity: Option<Value>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, rename = "end_date")]
    pub end_date_snake: Option<String>,
    #[serde(default)]
    pub end_date_iso: Option<String>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub accepting_orders: Option<bool>,
}

impl MarketData {
    /// Closed markets and markets not accepting orders cannot be traded
    pub fn is_open(&self) -> bool {
        self.closed != Some(true) && self.accepting_orders != Some(false)
    }
}

/// Tag attached to an event or search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagData {
    #[serde(default)]
    pub label: Option<String>,
}

impl TagData {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

/// Search payload stored under the `["search", ...]` query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchData {
    #[serde(default)]
    pub pages: Vec<SearchPage>,
}

/// One page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub results: Option<Vec<SearchItem>>,
    #[serde(default)]
    pub next_cursor: Option<Value>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
}

/// Event entry returned by search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub series_slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<TagData>>,
    #[serde(default)]
    pub volume: Option<Value>,
    #[serde(default)]
    pub markets: Option<Vec<Value>>,
}

impl SearchItem {
    /// Lower-cased tag labels
    pub fn tag_labels(&self) -> Vec<String> {
        self.tags
            .iter()
            .flatten()
            .filter_map(|t| t.label.as_deref())
            .map(str::to_lowercase)
            .collect()
    }
}

/// Interpret a JSON number or numeric string as a decimal
pub fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) if !s.trim().is_empty() => Decimal::from_str(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .ok(),
        _ => None,
    }
}

/// Interpret a JSON string or number as an identifier
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
