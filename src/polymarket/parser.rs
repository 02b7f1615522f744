//! Event page parsing
//!
//! Turns the HTML of a Polymarket event page into an [`Event`]. The embedded
//! `__NEXT_DATA__` payload is preferred; when it is missing or unusable the
//! title and description are read from the visible markup instead.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use scraper::{Html, Selector};
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, warn};

use super::messages::{value_to_decimal, value_to_string, EventData, MarketData, SearchData};
use crate::common::types::{Event, Market, StrikeMeta};

const DEFAULT_OUTCOME_PRICE: Decimal = dec!(0.5);
const DEFAULT_SPREAD: Decimal = dec!(0.02);

/// Strike patterns in priority order: thousands suffix, millions suffix,
/// dollar amount, bare comma-grouped number
static STRIKE_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"\$?\s?(\d+[\d,]*\.?\d*)\s?([kK])\b").unwrap(),
        Regex::new(r"\$?\s?(\d+[\d,]*\.?\d*)\s?([mM])\b").unwrap(),
        Regex::new(r"\$\s?(\d+[\d,]*)").unwrap(),
        Regex::new(r"(\d+[\d,]+)").unwrap(),
    ]
});

static NEXT_DATA_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script#__NEXT_DATA__"#).unwrap());
static H1_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static OG_TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static OG_DESCRIPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());

/// Extract the strike level from a market question
///
/// # Examples
/// * `"Will Bitcoin reach $120k?"` → 120000 (`KUSD`)
/// * `"Will ETH reach $4,300?"` → 4300 (`USD`)
pub fn extract_strike_from_text(text: &str) -> Option<StrikeMeta> {
    for (idx, pattern) in STRIKE_PATTERNS.iter().enumerate() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let raw = caps.get(0)?.as_str().to_string();
        let digits = caps.get(1)?.as_str().replace(',', "");
        let Ok(value) = Decimal::from_str(digits.trim_end_matches('.')) else {
            continue;
        };

        let (multiplier, unit) = match idx {
            0 => (Decimal::ONE_THOUSAND, "KUSD"),
            1 => (Decimal::from(1_000_000), "USD"),
            _ => (Decimal::ONE, "USD"),
        };
        // A suffixed amount too large to scale is not a strike.
        let value = value.checked_mul(multiplier)?;

        return Some(StrikeMeta {
            raw,
            value,
            unit: unit.to_string(),
        });
    }
    None
}

/// Parse the `__NEXT_DATA__` JSON embedded in a page
pub fn load_next_data(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let script = document.select(&NEXT_DATA_SELECTOR).next()?;
    let text: String = script.text().collect();
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to decode __NEXT_DATA__: {}", e);
            None
        }
    }
}

/// React Query entries of a page payload
///
/// Full pages nest them under `props.pageProps`; `/_next/data` responses
/// start at `pageProps`.
pub fn extract_queries(next_data: &Value) -> &[Value] {
    let container = next_data
        .get("props")
        .and_then(|p| p.get("pageProps"))
        .or_else(|| next_data.get("pageProps"));

    container
        .and_then(|c| c.get("dehydratedState"))
        .and_then(|d| d.get("queries"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// `state.data` of the first query whose key satisfies `matcher`
pub fn find_query_data<'a, F>(next_data: &'a Value, matcher: F) -> Option<&'a Value>
where
    F: Fn(&Value) -> bool,
{
    extract_queries(next_data)
        .iter()
        .find(|q| q.get("queryKey").is_some_and(&matcher))
        .and_then(|q| q.get("state"))
        .and_then(|s| s.get("data"))
}

/// Event object cached under the `/api/event/slug` query
pub fn extract_event_data(next_data: &Value) -> Option<&Value> {
    extract_queries(next_data).iter().find_map(|q| {
        let key = q.get("queryKey")?;
        if !key.to_string().contains("/api/event/slug") {
            return None;
        }
        q.get("state")
            .and_then(|s| s.get("data"))
            .filter(|d| d.as_object().is_some_and(|o| !o.is_empty()))
    })
}

/// Search payload cached under a `["search", ...]` query
pub fn extract_search_data(next_data: &Value) -> Option<SearchData> {
    let data = find_query_data(next_data, |key| {
        key.as_array()
            .and_then(|k| k.first())
            .and_then(Value::as_str)
            == Some("search")
    })?;
    serde_json::from_value(data.clone()).ok()
}

/// `(yes, no)` from an `outcomePrices` field
///
/// Accepts an array or a JSON-encoded array string. Missing or unreadable
/// entries fall back to 0.5.
pub fn parse_outcome_prices(value: Option<&Value>) -> (Decimal, Decimal) {
    let decoded = match value {
        Some(Value::String(s)) => serde_json::from_str::<Value>(s).ok(),
        Some(other) => Some(other.clone()),
        None => None,
    };

    match decoded.as_ref().and_then(Value::as_array) {
        Some(prices) if prices.len() >= 2 => {
            let price = |v: &Value| value_to_decimal(v).unwrap_or(DEFAULT_OUTCOME_PRICE);
            (price(&prices[0]), price(&prices[1]))
        }
        _ => (DEFAULT_OUTCOME_PRICE, DEFAULT_OUTCOME_PRICE),
    }
}

/// Convert market payloads into open markets
pub fn parse_markets(markets_data: &[MarketData]) -> Vec<Market> {
    let mut markets = Vec::with_capacity(markets_data.len());

    for data in markets_data {
        if !data.is_open() {
            debug!(id = ?data.id, "Skipping closed market");
            continue;
        }

        let question = data.question.clone().unwrap_or_default();
        let (yes_price, no_price) = parse_outcome_prices(data.outcome_prices.as_ref());
        let liquidity = data
            .liquidity_num
            .as_ref()
            .and_then(value_to_decimal)
            .or_else(|| data.liquidity.as_ref().and_then(value_to_decimal));

        markets.push(Market {
            id: data
                .id
                .as_ref()
                .and_then(value_to_string)
                .unwrap_or_else(|| format!("market_{}", markets.len())),
            strike: extract_strike_from_text(&question),
            question,
            yes_price,
            no_price,
            spread: data
                .spread
                .as_ref()
                .and_then(value_to_decimal)
                .unwrap_or(DEFAULT_SPREAD),
            liquidity,
            end_date: data
                .end_date
                .clone()
                .or_else(|| data.end_date_snake.clone())
                .or_else(|| data.end_date_iso.clone()),
        });
    }

    markets
}

/// Build an [`Event`] from its cached payload
pub fn build_event(slug: &str, data: EventData) -> Event {
    let tags = data
        .tags
        .iter()
        .filter_map(|t| t.label.clone())
        .filter(|l| !l.is_empty())
        .collect();

    Event {
        id: data
            .id
            .as_ref()
            .and_then(value_to_string)
            .unwrap_or_else(|| slug.to_string()),
        title: data.title.unwrap_or_else(|| slug.to_string()),
        description: data.description.unwrap_or_default(),
        slug: slug.to_string(),
        markets: parse_markets(&data.markets),
        resolve_time: data.end_date.or(data.end_date_snake),
        tags,
        series_slug: data.series_slug,
        volume: data.volume.as_ref().and_then(value_to_decimal),
    }
}

/// Parse an event page into an [`Event`]
pub fn parse_event_page(slug: &str, html: &str) -> Event {
    if let Some(next_data) = load_next_data(html) {
        if let Some(raw) = extract_event_data(&next_data) {
            match serde_json::from_value::<EventData>(raw.clone()) {
                Ok(data) => return build_event(slug, data),
                Err(e) => warn!(slug, "Unreadable event payload, using page markup: {}", e),
            }
        }
    }

    let document = Html::parse_document(html);
    let title = document
        .select(&H1_SELECTOR)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| meta_content(&document, &OG_TITLE_SELECTOR));
    let description = meta_content(&document, &OG_DESCRIPTION_SELECTOR);

    Event {
        id: slug.to_string(),
        title: title.unwrap_or_else(|| slug.to_string()),
        description: description.unwrap_or_default(),
        slug: slug.to_string(),
        markets: Vec::new(),
        resolve_time: None,
        tags: Vec::new(),
        series_slug: None,
        volume: None,
    }
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(str::to_string)
        .filter(|c| !c.is_empty())
}
