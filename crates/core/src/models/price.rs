use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::asset::AssetUniverse;

/// A single historical sample (epoch milliseconds → USD price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Self { timestamp_ms, price }
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

/// Current quotes as returned by a feed: feed id (e.g. "dogecoin") → USD price.
pub type PriceQuotes = HashMap<String, f64>;

/// Outcome of applying one batch of quotes to the price state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Symbols whose price was overwritten.
    pub updated: Vec<String>,
    /// Symbols absent from the batch; their previous price was kept.
    pub missing: Vec<String>,
}

impl RefreshReport {
    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Last known USD price per ticker symbol.
///
/// A symbol that has never been quoted is *unknown*, not zero. Applying a
/// batch only ever adds or overwrites entries; nothing is removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceState {
    prices: HashMap<String, f64>,
    last_refreshed: Option<DateTime<Utc>>,
}

impl PriceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last committed price for `symbol` (case-insensitive).
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(&symbol.to_uppercase()).copied()
    }

    /// Price used for valuation: unknown prices count as zero.
    pub fn get_or_zero(&self, symbol: &str) -> f64 {
        self.get(symbol).unwrap_or(0.0)
    }

    /// Directly set one price. Rejects values that are not finite and non-negative.
    pub fn set(&mut self, symbol: &str, price: f64) -> bool {
        if !price.is_finite() || price < 0.0 {
            return false;
        }
        self.prices.insert(symbol.to_uppercase(), price);
        true
    }

    /// Merge a batch of feed quotes.
    ///
    /// Quotes that are missing, non-finite or not strictly positive leave the
    /// previous price in place.
    pub fn apply_quotes(
        &mut self,
        universe: &AssetUniverse,
        quotes: &PriceQuotes,
        at: DateTime<Utc>,
    ) -> RefreshReport {
        let mut report = RefreshReport::default();
        for asset in universe.assets() {
            match quotes.get(&asset.id) {
                Some(&price) if price.is_finite() && price > 0.0 => {
                    self.prices.insert(asset.symbol.clone(), price);
                    report.updated.push(asset.symbol.clone());
                }
                _ => report.missing.push(asset.symbol.clone()),
            }
        }
        self.last_refreshed = Some(at);
        report
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prices.iter().map(|(s, p)| (s.as_str(), *p))
    }
}
