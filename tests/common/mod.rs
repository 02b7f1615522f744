//! Common test utilities and fixtures

#![allow(dead_code)]

use ladder_hedge::strategy::{MarketSnapshot, StrategyParameters, Strike};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

/// Two strikes ten percent either side of an anchor of 100
pub fn two_strike_snapshot(yes_90: Decimal, yes_110: Decimal) -> MarketSnapshot {
    MarketSnapshot::new(
        dec!(100),
        vec![
            Strike::from_yes(dec!(90), yes_90),
            Strike::from_yes(dec!(110), yes_110),
        ],
    )
}

/// Ladder with matching spacing and mirrored quotes around an anchor of 100
pub fn symmetric_ladder() -> MarketSnapshot {
    MarketSnapshot::new(
        dec!(100),
        vec![
            Strike::from_yes(dec!(80), dec!(0.85)),
            Strike::from_yes(dec!(90), dec!(0.7)),
            Strike::from_yes(dec!(110), dec!(0.3)),
            Strike::from_yes(dec!(120), dec!(0.15)),
        ],
    )
}

/// Uneven ladder with an extra strike just below an anchor of 100
pub fn five_strike_ladder() -> MarketSnapshot {
    MarketSnapshot::new(
        dec!(100),
        vec![
            Strike::from_yes(dec!(80), dec!(0.85)),
            Strike::from_yes(dec!(90), dec!(0.7)),
            Strike::from_yes(dec!(95), dec!(0.6)),
            Strike::from_yes(dec!(110), dec!(0.3)),
            Strike::from_yes(dec!(120), dec!(0.15)),
        ],
    )
}

/// Scenario 1 parameters: budget 1000, risk cap 500, no fees, beta 1
pub fn scenario_params() -> StrategyParameters {
    StrategyParameters::new(dec!(1000))
        .with_risk_cap(dec!(500))
        .with_beta(dec!(1))
}

/// Wrap a `__NEXT_DATA__` payload in a minimal page
pub fn next_data_page(next_data: &Value) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>Polymarket</title></head>
<body><div id="__next"></div>
<script id="__NEXT_DATA__" type="application/json">{}</script>
</body></html>"#,
        next_data
    )
}

/// Event payload for a four-strike Bitcoin ladder around 110k
pub fn btc_event_data() -> Value {
    json!({
        "id": "16171",
        "title": "Bitcoin above ___ on October 20?",
        "description": "Resolves YES if the Binance BTC/USDT close is above the strike.",
        "seriesSlug": "btc-multi-strikes-weekly",
        "volume": 2500000,
        "tags": [{"label": "Bitcoin"}, {"label": "Crypto"}, {"label": "Multi Strikes"}],
        "markets": [
            {"id": "501", "question": "Bitcoin above $105k on October 20?",
             "outcomePrices": "[\"0.8\", \"0.2\"]", "spread": 0.01, "liquidityNum": 12000},
            {"id": "502", "question": "Bitcoin above $108k on October 20?",
             "outcomePrices": ["0.65", "0.35"], "spread": "0.02"},
            {"id": "503", "question": "Bitcoin above $112k on October 20?",
             "outcomePrices": ["0.35", "0.65"]},
            {"id": "504", "question": "Bitcoin above $115k on October 20?",
             "outcomePrices": ["0.2", "0.8"]},
            {"id": "505", "question": "Bitcoin above $100k on October 20?",
             "outcomePrices": ["0.99", "0.01"], "closed": true}
        ]
    })
}

/// Full event page for `slug` embedding [`btc_event_data`]
pub fn btc_event_page(slug: &str) -> String {
    next_data_page(&json!({
        "buildId": "build-1",
        "props": {"pageProps": {"dehydratedState": {"queries": [
            {"queryKey": ["/api/event/slug", slug], "state": {"data": btc_event_data()}}
        ]}}}
    }))
}

/// Search page payload with one page of results
pub fn search_page(results: Value, next_cursor: Option<&str>) -> Value {
    json!({
        "buildId": "build-1",
        "props": {"pageProps": {"dehydratedState": {"queries": [
            {"queryKey": ["search", {"query": "bitcoin"}], "state": {"data": {
                "pages": [{
                    "results": results,
                    "nextCursor": next_cursor,
                    "hasNextPage": next_cursor.is_some()
                }]
            }}}
        ]}}}
    })
}
