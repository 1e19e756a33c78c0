use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::Asset;
use super::price::PricePoint;

/// Lookback window of an hourly history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub days: u32,
}

impl HistoryWindow {
    /// The chart window: the last 24 hours, one sample per hour.
    pub const ONE_DAY_HOURLY: HistoryWindow = HistoryWindow {
        days: 1,
    };
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::ONE_DAY_HOURLY
    }
}

/// A price series ready for the view layer to plot.
///
/// The core fetches and orders the samples; the frontend only renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub asset: Asset,
    pub window: HistoryWindow,
    /// Sorted by timestamp, oldest first
    pub points: Vec<PricePoint>,
    pub fetched_at: DateTime<Utc>,
}

impl ChartSeries {
    pub fn new(asset: Asset, window: HistoryWindow, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp_ms);
        Self {
            asset,
            window,
            points,
            fetched_at: Utc::now(),
        }
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price)
    }

    /// Lowest and highest price in the series, for axis scaling.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.points.iter().map(|p| p.price);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Relative change from the first to the last sample, in percent.
    pub fn change_percent(&self) -> Option<f64> {
        let first = self.points.first()?.price;
        let last = self.points.last()?.price;
        if first <= 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}
