use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use crate::errors::CoreError;
use crate::models::asset::AssetUniverse;
use crate::models::chart::{ChartSeries, HistoryWindow};
use crate::models::price::{PriceState, RefreshReport};
use crate::providers::traits::PriceFeed;

/// Keeps `PriceState` current and loads chart history from a `PriceFeed`.
///
/// Locks are only taken around in-memory updates, never across a network
/// await, so trades can read prices while a request is in flight.
///
/// **Chart supersession**: every `fetch_history` call takes a new generation
/// number. A result is only committed if no newer call (or `clear_chart`)
/// has started since, so a slow response for a previously selected coin
/// can never overwrite the chart of the coin selected now.
pub struct PriceSynchronizer {
    feed: Box<dyn PriceFeed>,
    universe: AssetUniverse,
    prices: RwLock<PriceState>,
    chart: Mutex<Option<ChartSeries>>,
    history_generation: AtomicU64,
}

impl PriceSynchronizer {
    pub fn new(feed: Box<dyn PriceFeed>, universe: AssetUniverse) -> Self {
        Self {
            feed,
            universe,
            prices: RwLock::new(PriceState::new()),
            chart: Mutex::new(None),
            history_generation: AtomicU64::new(0),
        }
    }

    pub fn feed_name(&self) -> &str {
        self.feed.name()
    }

    pub fn universe(&self) -> &AssetUniverse {
        &self.universe
    }

    /// Fetch current prices for the whole universe in one request.
    ///
    /// On success, coins present in the response are overwritten and coins
    /// absent from it keep their previous price. On failure the price state
    /// is not touched at all and `FeedUnavailable` is returned.
    pub async fn refresh_all(&self) -> Result<RefreshReport, CoreError> {
        let ids = self.universe.feed_ids();

        let quotes = match self.feed.get_current_prices(&ids).await {
            Ok(quotes) => quotes,
            Err(e) => {
                let err = self.feed_error(e);
                tracing::warn!(feed = self.feed.name(), "price refresh failed: {err}");
                return Err(err);
            }
        };

        let report = {
            let mut prices = self.prices.write().unwrap_or_else(|e| e.into_inner());
            prices.apply_quotes(&self.universe, &quotes, Utc::now())
        };

        if report.is_partial() {
            tracing::warn!(
                missing = ?report.missing,
                "feed omitted some coins, keeping their previous prices"
            );
        }
        tracing::info!(updated = ?report.updated, "prices refreshed");
        Ok(report)
    }

    /// Fetch the one-day hourly series for `symbol` and make it the current chart.
    ///
    /// - `UnknownAsset` if the symbol isn't tradable
    /// - `Superseded` if a newer request started while this one was in flight
    /// - `FeedUnavailable` on transport/parse failure (current chart is kept)
    pub async fn fetch_history(&self, symbol: &str) -> Result<ChartSeries, CoreError> {
        let asset = self
            .universe
            .by_symbol(symbol)
            .cloned()
            .ok_or_else(|| CoreError::UnknownAsset(symbol.to_string()))?;

        let generation = self.history_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let window = HistoryWindow::ONE_DAY_HOURLY;
        let result = self.feed.get_history(&asset.id, window).await;

        let mut chart = self.chart.lock().unwrap_or_else(|e| e.into_inner());
        if self.history_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(symbol = %asset.symbol, "discarding superseded history response");
            return Err(CoreError::Superseded(asset.symbol));
        }

        match result {
            Ok(points) => {
                let series = ChartSeries::new(asset, window, points);
                tracing::info!(
                    symbol = %series.asset.symbol,
                    points = series.points.len(),
                    "history loaded"
                );
                *chart = Some(series.clone());
                Ok(series)
            }
            Err(e) => {
                let err = self.feed_error(e);
                tracing::warn!(symbol = %asset.symbol, "history request failed: {err}");
                Err(err)
            }
        }
    }

    /// Last committed chart series, if any.
    pub fn current_chart(&self) -> Option<ChartSeries> {
        self.chart.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Hide the chart. Any history request still in flight is discarded.
    pub fn clear_chart(&self) {
        self.history_generation.fetch_add(1, Ordering::SeqCst);
        *self.chart.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Copy of the current price table.
    pub fn price_state(&self) -> PriceState {
        self.prices.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Run `f` against the price table under a read lock.
    pub fn with_prices<R>(&self, f: impl FnOnce(&PriceState) -> R) -> R {
        let prices = self.prices.read().unwrap_or_else(|e| e.into_inner());
        f(&prices)
    }

    /// Manually set a price, bypassing the feed. Returns false for invalid prices.
    pub fn set_price(&self, symbol: &str, price: f64) -> bool {
        if self.universe.by_symbol(symbol).is_none() {
            return false;
        }
        self.prices
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .set(symbol, price)
    }

    /// Normalize anything the feed returned into `FeedUnavailable`.
    fn feed_error(&self, e: CoreError) -> CoreError {
        match e {
            CoreError::FeedUnavailable { .. } => e,
            other => CoreError::FeedUnavailable {
                provider: self.feed.name().to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl std::fmt::Debug for PriceSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceSynchronizer")
            .field("feed", &self.feed.name())
            .field("assets", &self.universe.len())
            .field("known_prices", &self.price_state().len())
            .field("history_generation", &self.history_generation.load(Ordering::SeqCst))
            .finish()
    }
}
