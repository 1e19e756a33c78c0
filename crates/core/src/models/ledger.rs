use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::asset::AssetUniverse;
use super::transaction::Transaction;

/// Starting cash for every new session.
pub const DEFAULT_STARTING_CASH_USD: f64 = 10_000.0;

/// Cash, holdings and trade history of one session.
///
/// Fields are private so that the only way to change them is through
/// `LedgerService`, which keeps cash and every holding non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    cash_usd: f64,
    holdings: HashMap<String, f64>,
    /// Oldest first. Append-only.
    history: Vec<Transaction>,
}

impl Ledger {
    /// A fresh ledger with `cash_usd` and a zero holding for every universe symbol.
    pub fn new(universe: &AssetUniverse, cash_usd: f64) -> Self {
        let holdings = universe.symbols().map(|s| (s.to_string(), 0.0)).collect();
        Self {
            cash_usd,
            holdings,
            history: Vec::new(),
        }
    }

    pub fn cash_usd(&self) -> f64 {
        self.cash_usd
    }

    pub fn holding(&self, symbol: &str) -> f64 {
        self.holdings
            .get(&symbol.to_uppercase())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn holdings(&self) -> &HashMap<String, f64> {
        &self.holdings
    }

    /// History in insertion order (oldest first).
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// History for display (newest first).
    pub fn history_newest_first(&self) -> Vec<&Transaction> {
        self.history.iter().rev().collect()
    }

    // Mutators are crate-private: LedgerService validates before calling them.

    pub(crate) fn debit(&mut self, symbol: &str, cost: f64, quantity: f64) {
        self.cash_usd -= cost;
        *self.holdings.entry(symbol.to_string()).or_insert(0.0) += quantity;
    }

    pub(crate) fn credit(&mut self, symbol: &str, revenue: f64, quantity: f64) {
        self.cash_usd += revenue;
        let held = self.holdings.entry(symbol.to_string()).or_insert(0.0);
        *held = (*held - quantity).max(0.0);
    }

    pub(crate) fn record(&mut self, tx: Transaction) {
        self.history.push(tx);
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(&AssetUniverse::default(), DEFAULT_STARTING_CASH_USD)
    }
}
