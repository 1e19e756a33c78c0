use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::chart::HistoryWindow;
use crate::models::price::{PricePoint, PriceQuotes};
use crate::models::settings::Settings;
use super::traits::PriceFeed;

const PROVIDER: &str = "CoinGecko";

/// CoinGecko API feed for cryptocurrency prices.
///
/// - **Free**: No API key required (public tier is rate limited).
/// - **Endpoints**: `/simple/price?ids=…&vs_currencies=usd`,
///   `/coins/{id}/market_chart?vs_currency=usd&days=1&interval=hourly`
///
/// CoinGecko identifies coins by lowercase ids ("dogecoin", "cardano"),
/// which is what `Asset::id` carries.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    vs_currency: String,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let builder = Client::builder().timeout(settings.request_timeout());
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: settings.feed_base_url.trim_end_matches('/').to_string(),
            vs_currency: settings.quote_currency.to_lowercase(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the batched current-price request.
    pub fn simple_price_url(&self, ids: &[String]) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            ids.join(","),
            self.vs_currency
        )
    }

    /// URL of the historical series request for one coin.
    pub fn market_chart_url(&self, id: &str, window: HistoryWindow) -> String {
        format!(
            "{}/coins/{id}/market_chart?vs_currency={}&days={}&interval=hourly",
            self.base_url,
            self.vs_currency,
            window.days
        )
    }

    /// Parse a `/simple/price` body into id → price.
    ///
    /// Coins without a quote in the configured currency are left out.
    pub fn parse_simple_prices(&self, body: &str) -> Result<PriceQuotes, CoreError> {
        let resp: HashMap<String, HashMap<String, Option<f64>>> =
            serde_json::from_str(body).map_err(|e| CoreError::FeedUnavailable {
                provider: PROVIDER.into(),
                message: format!("Failed to parse price response: {e}"),
            })?;

        Ok(resp
            .into_iter()
            .filter_map(|(id, quotes)| {
                let price = quotes.get(&self.vs_currency).copied().flatten()?;
                Some((id, price))
            })
            .collect())
    }

    /// Parse a `/market_chart` body into time-ordered samples.
    ///
    /// Malformed samples (wrong arity, non-finite price) are skipped.
    pub fn parse_market_chart(&self, id: &str, body: &str) -> Result<Vec<PricePoint>, CoreError> {
        let resp: MarketChartResponse =
            serde_json::from_str(body).map_err(|e| CoreError::FeedUnavailable {
                provider: PROVIDER.into(),
                message: format!("Failed to parse history for {id}: {e}"),
            })?;

        let mut points: Vec<PricePoint> = resp
            .prices
            .iter()
            .filter_map(|sample| {
                let [ts, price] = sample.as_slice() else {
                    return None;
                };
                if !ts.is_finite() || !price.is_finite() {
                    return None;
                }
                Some(PricePoint::new(*ts as i64, *price))
            })
            .collect();
        points.sort_by_key(|p| p.timestamp_ms);
        Ok(points)
    }

    async fn get_text(&self, url: &str) -> Result<String, CoreError> {
        tracing::debug!(provider = PROVIDER, %url, "requesting");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::FeedUnavailable {
                provider: PROVIDER.into(),
                message: format!("HTTP {status}"),
            });
        }
        Ok(resp.text().await?)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CoinGeckoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoProvider")
            .field("base_url", &self.base_url)
            .field("vs_currency", &self.vs_currency)
            .finish()
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct MarketChartResponse {
    /// `[[timestamp_ms, price], …]`
    prices: Vec<Vec<f64>>,
}

#[async_trait]
impl PriceFeed for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_current_prices(&self, ids: &[String]) -> Result<PriceQuotes, CoreError> {
        if ids.is_empty() {
            return Ok(PriceQuotes::new());
        }
        let body = self.get_text(&self.simple_price_url(ids)).await?;
        self.parse_simple_prices(&body)
    }

    async fn get_history(
        &self,
        id: &str,
        window: HistoryWindow,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let body = self.get_text(&self.market_chart_url(id, window)).await?;
        self.parse_market_chart(id, &body)
    }
}
