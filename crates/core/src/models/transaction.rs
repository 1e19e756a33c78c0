use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "Buy"),
            TradeSide::Sell => write!(f, "Sell"),
        }
    }
}

impl TradeSide {
    fn past_tense(&self) -> &'static str {
        match self {
            TradeSide::Buy => "bought",
            TradeSide::Sell => "sold",
        }
    }
}

/// A completed trade. Created once by the ledger, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub side: TradeSide,
    pub symbol: String,
    /// Coin quantity (always positive)
    pub quantity: f64,
    /// Unit price the trade executed at
    pub price: f64,
    /// Cost (buy) or revenue (sell) in USD
    pub amount_usd: f64,
}

impl Transaction {
    pub fn new(side: TradeSide, symbol: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            side,
            symbol: symbol.into(),
            quantity,
            price,
            amount_usd: quantity * price,
        }
    }

    /// e.g. `bought 100.0000 DOGE for 10.00 USD`
    pub fn description(&self) -> String {
        format!(
            "{} {:.4} {} for {:.2} USD",
            self.side.past_tense(),
            self.quantity,
            self.symbol,
            self.amount_usd
        )
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.timestamp.format("%H:%M:%S"), self.description())
    }
}
