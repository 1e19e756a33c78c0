use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the holdings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingLine {
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    /// `None` until the first successful refresh
    pub price: Option<f64>,
    pub value_usd: f64,
}

/// Point-in-time view of the ledger at current prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub cash_usd: f64,
    /// In universe order
    pub holdings: Vec<HoldingLine>,
    pub total_value: f64,
    pub trade_count: usize,
}

/// Point-in-time view of the price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// (symbol, price) in universe order; `None` if never quoted
    pub prices: Vec<(String, Option<f64>)>,
    pub last_refreshed: Option<DateTime<Utc>>,
}
