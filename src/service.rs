//! Market snapshot service
//!
//! Fetches the spot anchor and the ladder event concurrently, turns them into
//! a [`MarketSnapshot`] and hands it to the allocation engine.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::common::errors::{ClientError, Result};
use crate::common::traits::{EventSource, SpotPriceSource};
use crate::common::types::{Asset, Event};
use crate::strategy::{
    allocate, delta_neutral_pairs, highlight_strikes, Allocation, DeltaNeutralPair, FeeSchedule,
    MarketSnapshot, StrategyParameters, Strike, DEFAULT_HIGHLIGHT_MIN_PNL,
};

/// Inputs for one ladder analysis
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub asset: Asset,
    pub slug: String,
    pub parameters: StrategyParameters,
    /// Fixed horizon; when unset the event end date is used, then the
    /// parameters' own value
    pub days_override: Option<Decimal>,
    pub force_refresh: bool,
    /// Pair profit at which a non-adjacent strike is highlighted
    pub highlight_min_pnl: Decimal,
}

impl AnalysisRequest {
    pub fn new(asset: Asset, slug: impl Into<String>, parameters: StrategyParameters) -> Self {
        Self {
            asset,
            slug: slug.into(),
            parameters,
            days_override: None,
            force_refresh: false,
            highlight_min_pnl: DEFAULT_HIGHLIGHT_MIN_PNL,
        }
    }
}

/// Result of analyzing one ladder event
#[derive(Debug, Clone, Serialize)]
pub struct LadderAnalysis {
    pub asset: Asset,
    /// Venue the anchor was read from
    pub price_venue: &'static str,
    pub event: Event,
    pub snapshot: MarketSnapshot,
    /// Parameters after the horizon was resolved
    pub parameters: StrategyParameters,
    pub allocation: Allocation,
    /// Two-leg hedges, ascending by NO strike
    pub pairs: Vec<DeltaNeutralPair>,
    /// NO strikes of the pairs worth a closer look
    pub highlights: Vec<Decimal>,
}

/// Builds snapshots from a price source and an event source
pub struct SnapshotService<P, E> {
    prices: P,
    events: E,
}

impl<P, E> SnapshotService<P, E>
where
    P: SpotPriceSource,
    E: EventSource,
{
    pub fn new(prices: P, events: E) -> Self {
        Self { prices, events }
    }

    /// Fetch the anchor and the event concurrently
    ///
    /// Either failure fails the whole fetch; no default anchor is substituted.
    #[instrument(skip(self))]
    pub async fn fetch_snapshot(
        &self,
        asset: Asset,
        slug: &str,
        force_refresh: bool,
    ) -> Result<(Event, MarketSnapshot)> {
        let (anchor, event) = tokio::join!(
            self.prices.spot_price(asset),
            self.events.event_by_slug(slug, force_refresh)
        );
        let anchor = anchor?;
        let event = event?;

        let snapshot = snapshot_from_event(anchor, &event);
        debug!(
            %anchor,
            venue = self.prices.venue_name(),
            strikes = snapshot.strikes.len(),
            "Built market snapshot"
        );
        Ok((event, snapshot))
    }

    /// Fetch a snapshot and run the allocation engine on it
    #[instrument(skip(self, request), fields(slug = %request.slug, asset = %request.asset))]
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<LadderAnalysis> {
        let (event, snapshot) = self
            .fetch_snapshot(request.asset, &request.slug, request.force_refresh)
            .await?;

        let days = request
            .days_override
            .or_else(|| event.days_to_resolution(Utc::now()))
            .unwrap_or(request.parameters.days_to_resolution);
        let parameters = request.parameters.with_days_to_resolution(days);

        let allocation = allocate(&snapshot, &parameters).map_err(ClientError::Allocation)?;
        info!(
            orders = allocation.summary.num_orders,
            total_cost = %allocation.summary.total_cost,
            worst_case_loss = %allocation.summary.worst_case_loss,
            "Ladder analysis complete"
        );

        let fees = FeeSchedule::from_params(&parameters);
        let pairs = delta_neutral_pairs(&snapshot.strikes, snapshot.anchor, &fees);
        let highlights = highlight_strikes(
            &pairs,
            &snapshot.strikes,
            snapshot.anchor,
            request.highlight_min_pnl,
        );
        debug!(pairs = pairs.len(), highlights = highlights.len(), "Paired neighbouring strikes");

        Ok(LadderAnalysis {
            asset: request.asset,
            price_venue: self.prices.venue_name(),
            event,
            snapshot,
            parameters,
            allocation,
            pairs: pairs.into_values().collect(),
            highlights: highlights.into_iter().collect(),
        })
    }
}

/// Snapshot of the event's markets that carry a strike, ascending by level
pub fn snapshot_from_event(anchor: Decimal, event: &Event) -> MarketSnapshot {
    let mut strikes: Vec<Strike> = event
        .markets
        .iter()
        .filter_map(|m| {
            m.strike_value()
                .map(|level| Strike::new(level, m.yes_price, m.no_price))
        })
        .collect();
    strikes.sort_by(|a, b| a.price_level.cmp(&b.price_level));
    MarketSnapshot::new(anchor, strikes)
}

/// Guess the asset of an event from its slug
///
/// Matches whole slug words against each asset's aliases.
pub fn infer_asset(slug: &str) -> Option<Asset> {
    let words: Vec<String> = slug
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    Asset::ALL.into_iter().find(|asset| {
        asset
            .aliases()
            .iter()
            .any(|alias| words.iter().any(|w| w.as_str() == *alias))
    })
}
