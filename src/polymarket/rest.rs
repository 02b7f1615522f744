//! HTTP client for Polymarket website pages

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, EXPIRES, PRAGMA};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::messages::{value_to_string, SearchData, SearchItem};
use super::parser::{extract_search_data, load_next_data, parse_event_page};
use crate::common::errors::{ClientError, Result};
use crate::common::traits::EventSource;
use crate::common::types::Event;
use crate::config::types::PolymarketConfig;

/// Client for Polymarket event, series and search pages
#[derive(Debug, Clone)]
pub struct PolymarketWebClient {
    /// HTTP client
    client: Client,
    /// Website base URL (e.g. `https://polymarket.com`)
    base_url: String,
    /// Maximum search result pages followed per query
    max_search_pages: u32,
}

impl PolymarketWebClient {
    /// Create a new client with default settings
    pub fn new(base_url: &str) -> Result<Self> {
        let config = PolymarketConfig {
            base_url: base_url.to_string(),
            ..PolymarketConfig::default()
        };
        Self::from_config(&config, Duration::from_secs(30))
    }

    /// Create a client from configuration
    pub fn from_config(config: &PolymarketConfig, timeout: Duration) -> Result<Self> {
        Url::parse(&config.base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_search_pages: config.max_search_pages.max(1),
        })
    }

    /// Website base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET request that bypasses intermediary caches when `force_refresh` is set
    fn page_request(&self, url: &str, force_refresh: bool) -> RequestBuilder {
        let request = self.client.get(url);
        if !force_refresh {
            return request;
        }
        request
            .headers(no_cache_headers())
            .query(&[("_ts", chrono::Utc::now().timestamp())])
    }

    /// Fetch and parse an event page
    ///
    /// # Arguments
    /// * `slug` - Event slug as it appears in `/event/<slug>`
    /// * `force_refresh` - Send no-cache headers and a cache-busting timestamp
    #[instrument(skip(self))]
    pub async fn parse_event_by_slug(&self, slug: &str, force_refresh: bool) -> Result<Event> {
        let url = format!("{}/event/{}", self.base_url, slug);
        debug!("Fetching event page from: {}", url);

        let response = self.page_request(&url, force_refresh).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::EventNotFound(slug.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(ClientError::InvalidResponse(format!(
                "Event page returned status {} for {}",
                status, slug
            )));
        }

        let html = response.text().await?;
        let event = parse_event_page(slug, &html);
        debug!(slug, markets = event.markets.len(), "Parsed event page");
        Ok(event)
    }

    /// Collect search results for a query, following cursor pages
    ///
    /// The first page is read from the rendered search page; later pages come
    /// from the `/_next/data/<buildId>/search.json` endpoint.
    #[instrument(skip(self))]
    pub async fn get_search_results(
        &self,
        query: &str,
        force_refresh: bool,
    ) -> Result<Vec<SearchItem>> {
        let url = format!("{}/search", self.base_url);
        debug!("Fetching search results from: {}", url);

        let response = self
            .page_request(&url, force_refresh)
            .query(&[("query", query), ("status", "active")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::InvalidResponse(format!(
                "Search returned status {}: {}",
                status, body
            )));
        }

        let html = response.text().await?;
        let Some(next_data) = load_next_data(&html) else {
            return Ok(Vec::new());
        };
        let build_id = next_data
            .get("buildId")
            .and_then(Value::as_str)
            .map(str::to_string);
        let Some(search) = extract_search_data(&next_data) else {
            return Ok(Vec::new());
        };

        let mut results = gather_results(&search);
        let (mut cursor, mut has_next) = next_cursor(&search);
        let mut page_count = 1;

        while has_next && page_count < self.max_search_pages {
            let (Some(build_id), Some(current)) = (build_id.as_deref(), cursor.as_deref()) else {
                break;
            };
            let page = match self.get_search_page(build_id, query, current).await {
                Ok(Some(page)) if !page.pages.is_empty() => page,
                Ok(_) => break,
                Err(e) => {
                    warn!(query, cursor = current, "Failed to fetch search page: {}", e);
                    break;
                }
            };

            results.extend(gather_results(&page));
            (cursor, has_next) = next_cursor(&page);
            page_count += 1;
        }

        debug!(query, results = results.len(), pages = page_count, "Collected search results");
        Ok(results)
    }

    /// Fetch one follow-up search page from the Next.js data endpoint
    async fn get_search_page(
        &self,
        build_id: &str,
        query: &str,
        cursor: &str,
    ) -> Result<Option<SearchData>> {
        let url = format!("{}/_next/data/{}/search.json", self.base_url, build_id);
        debug!("Fetching search page from: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("query", query), ("status", "active"), ("cursor", cursor)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::InvalidResponse(format!(
                "Search data returned status {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;
        Ok(extract_search_data(&data))
    }

    /// Resolve a series slug to its current event slug
    ///
    /// Series pages redirect to the live event. Returns `None` for unknown
    /// series or when no event path can be determined.
    #[instrument(skip(self))]
    pub async fn resolve_series_event_slug(
        &self,
        series_slug: &str,
        force_refresh: bool,
    ) -> Result<Option<String>> {
        let url = format!("{}/series/{}", self.base_url, series_slug);
        debug!("Resolving series from: {}", url);

        let response = self.page_request(&url, force_refresh).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ClientError::InvalidResponse(format!(
                "Series page returned status {} for {}",
                response.status(),
                series_slug
            )));
        }

        if let Some(slug) = event_slug_from_path(response.url().path()) {
            return Ok(Some(slug));
        }

        let body = response.text().await?;
        Ok(event_slug_from_path(body.trim()))
    }
}

#[async_trait]
impl EventSource for PolymarketWebClient {
    async fn event_by_slug(&self, slug: &str, force_refresh: bool) -> Result<Event> {
        self.parse_event_by_slug(slug, force_refresh).await
    }
}

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    headers
}

fn gather_results(search: &SearchData) -> Vec<SearchItem> {
    search
        .pages
        .iter()
        .flat_map(|p| p.results.iter().flatten().cloned())
        .collect()
}

fn next_cursor(search: &SearchData) -> (Option<String>, bool) {
    match search.pages.last() {
        Some(page) => (
            page.next_cursor.as_ref().and_then(value_to_string),
            page.has_next_page.unwrap_or(false),
        ),
        None => (None, false),
    }
}

/// Event slug from a path like `/event/<slug>`
fn event_slug_from_path(path: &str) -> Option<String> {
    path.strip_prefix("/event/")
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|slug| !slug.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PolymarketWebClient::new("https://polymarket.com/").unwrap();
        assert_eq!(client.base_url(), "https://polymarket.com");
        assert_eq!(client.max_search_pages, 3);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = PolymarketWebClient::new("not a url");
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_event_slug_from_path() {
        assert_eq!(
            event_slug_from_path("/event/bitcoin-above-on-october-20"),
            Some("bitcoin-above-on-october-20".to_string())
        );
        assert_eq!(event_slug_from_path("/event/"), None);
        assert_eq!(event_slug_from_path("/series/btc-weekly"), None);
    }

    #[test]
    fn test_next_cursor_reads_last_page() {
        let search: SearchData = serde_json::from_value(serde_json::json!({
            "pages": [
                {"results": [], "nextCursor": "a", "hasNextPage": true},
                {"results": [], "nextCursor": 20, "hasNextPage": true}
            ]
        }))
        .unwrap();
        assert_eq!(next_cursor(&search), (Some("20".to_string()), true));
        assert_eq!(next_cursor(&SearchData::default()), (None, false));
    }
}
