//! Ladder event discovery
//!
//! Finds the currently listed strike-ladder events for each asset. Series
//! pages are tried first since they redirect straight to the live event;
//! site search is the fallback when no series resolves.

use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::messages::{value_to_decimal, SearchItem, TagData};
use super::rest::PolymarketWebClient;
use crate::common::errors::Result;
use crate::common::types::{format_volume, Asset, Event, EventSummary};

/// Phrases that mark a price-ladder question
const LADDER_KEYWORDS: [&str; 7] = [
    "what price will",
    "price on",
    "price be on",
    "price be at",
    "price hit",
    "price will",
    "above",
];

const MONTH_KEYWORDS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Whether a search item refers to `asset`, by tag label or by an alias in
/// its title, slug, ticker or series slug
pub fn matches_asset(item: &SearchItem, asset: Asset) -> bool {
    let tags = item.tag_labels();
    let by_tag = asset
        .tag_labels()
        .iter()
        .chain(asset.aliases())
        .any(|label| tags.iter().any(|t| t.as_str() == *label));
    if by_tag {
        return true;
    }

    [&item.title, &item.slug, &item.ticker, &item.series_slug]
        .into_iter()
        .flatten()
        .map(|text| text.replace('-', " ").to_lowercase())
        .any(|text| asset.aliases().iter().any(|alias| text.contains(alias)))
}

/// Whether a search item looks like a strike ladder
pub fn is_ladder_event(item: &SearchItem, asset: Asset) -> bool {
    let series = item.series_slug.as_deref().unwrap_or_default().to_lowercase();
    if series.contains("multi-strikes") {
        return true;
    }

    if item.tag_labels().iter().any(|t| t.contains("multi strikes")) {
        return true;
    }

    let texts = [
        item.title.clone().unwrap_or_default(),
        item.slug.as_deref().unwrap_or_default().replace('-', " "),
        item.ticker.as_deref().unwrap_or_default().replace('-', " "),
        item.description.clone().unwrap_or_default(),
    ];

    texts
        .iter()
        .filter(|text| !text.is_empty())
        .map(|text| text.to_lowercase())
        .any(|lower| {
            asset
                .aliases()
                .iter()
                .any(|alias| lower.contains(alias) && contains_ladder_keywords(&lower, alias))
        })
}

/// Keyword test on lower-cased text that already mentions `alias`
pub fn contains_ladder_keywords(text: &str, alias: &str) -> bool {
    let combos = [
        format!("what price will {alias}"),
        format!("{alias} price on"),
        format!("price on {alias}"),
        format!("{alias} price be on"),
        format!("{alias} price be at"),
        format!("{alias} price will"),
        format!("price will {alias}"),
        format!("{alias} above"),
        format!("{alias} price above"),
    ];
    if combos.iter().any(|combo| text.contains(combo.as_str())) {
        return true;
    }

    if !text.contains(alias) {
        return false;
    }

    if text.contains("price") && LADDER_KEYWORDS.iter().any(|k| text.contains(k)) {
        return true;
    }

    let mentions_month = MONTH_KEYWORDS.iter().any(|m| text.contains(m));
    if mentions_month && (text.contains("price") || text.contains("above")) {
        return true;
    }

    text.contains("___") && text.contains("above")
}

/// Search-shaped view of a parsed event so series and search results share
/// one filter
pub fn event_to_item(event: &Event) -> SearchItem {
    SearchItem {
        title: Some(event.title.clone()),
        slug: Some(event.slug.clone()),
        ticker: None,
        series_slug: event.series_slug.clone(),
        description: Some(event.description.clone()),
        tags: Some(event.tags.iter().map(TagData::new).collect()),
        volume: event.volume.map(|v| Value::String(v.to_string())),
        markets: Some(vec![Value::Null; event.markets.len()]),
    }
}

/// Filter, de-duplicate and rank discovered items
///
/// Items must match their asset and look like a ladder. Duplicate slugs keep
/// the entry with the highest volume. Output is ordered by asset, then by
/// descending volume, then by title.
pub fn summarize(candidates: Vec<(Asset, Vec<SearchItem>)>) -> Vec<EventSummary> {
    let mut best: HashMap<(Asset, String), (EventSummary, Decimal)> = HashMap::new();

    for (asset, items) in candidates {
        for item in items {
            let Some(slug) = item.slug.clone().filter(|s| !s.is_empty()) else {
                continue;
            };
            if !matches_asset(&item, asset) || !is_ladder_event(&item, asset) {
                continue;
            }

            let volume = item
                .volume
                .as_ref()
                .and_then(value_to_decimal)
                .unwrap_or_default();
            let summary = EventSummary {
                title: item.title.clone().unwrap_or_else(|| slug.clone()),
                slug: slug.clone(),
                asset,
                volume: format_volume(volume),
                num_markets: item.markets.as_ref().map_or(0, Vec::len),
            };

            let key = (asset, slug);
            match best.get(&key) {
                Some((_, current)) if *current >= volume => {}
                _ => {
                    best.insert(key, (summary, volume));
                }
            }
        }
    }

    let mut entries: Vec<(EventSummary, Decimal)> = best.into_values().collect();
    entries.sort_by(|(a, va), (b, vb)| {
        a.asset
            .rank()
            .cmp(&b.asset.rank())
            .then_with(|| vb.cmp(va))
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });
    entries.into_iter().map(|(summary, _)| summary).collect()
}

impl PolymarketWebClient {
    /// List active ladder events for the given assets
    ///
    /// Lookup failures for a single series or query are logged and skipped.
    pub async fn get_crypto_events(
        &self,
        assets: &[Asset],
        force_refresh: bool,
    ) -> Result<Vec<EventSummary>> {
        let mut candidates = Vec::with_capacity(assets.len());

        for &asset in assets {
            let mut items = self.collect_series_events(asset, force_refresh).await;

            if items.is_empty() {
                for query in asset.search_queries() {
                    match self.get_search_results(query, force_refresh).await {
                        Ok(results) => items.extend(results),
                        Err(e) => warn!(%asset, query, "Search failed: {}", e),
                    }
                }
            }

            debug!(%asset, candidates = items.len(), "Collected discovery candidates");
            candidates.push((asset, items));
        }

        let summaries = summarize(candidates);
        info!("Discovered {} ladder events", summaries.len());
        Ok(summaries)
    }

    async fn collect_series_events(&self, asset: Asset, force_refresh: bool) -> Vec<SearchItem> {
        let mut items = Vec::new();

        for series in asset.series_slugs() {
            let slug = match self.resolve_series_event_slug(series, force_refresh).await {
                Ok(Some(slug)) => slug,
                Ok(None) => continue,
                Err(e) => {
                    warn!(series, "Failed to resolve series: {}", e);
                    continue;
                }
            };

            match self.parse_event_by_slug(&slug, force_refresh).await {
                Ok(event) => items.push(event_to_item(&event)),
                Err(e) => warn!(series, slug, "Failed to load series event: {}", e),
            }
        }

        items
    }
}
