//! Trait definitions for market snapshot collaborators

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::errors::Result;
use super::types::{Asset, Event};

/// Source of the current spot price used as the allocation anchor
///
/// Implementations report failures as errors; a missing price never turns
/// into a silent default.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpotPriceSource: Send + Sync {
    /// Current spot price of `asset` in USD
    async fn spot_price(&self, asset: Asset) -> Result<Decimal>;

    /// Name of the price venue
    fn venue_name(&self) -> &'static str;
}

/// Source of ladder events and their markets
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch and parse the event identified by `slug`
    ///
    /// # Arguments
    /// * `slug` - URL slug of the event
    /// * `force_refresh` - Bypass intermediary caches
    async fn event_by_slug(&self, slug: &str, force_refresh: bool) -> Result<Event>;
}
