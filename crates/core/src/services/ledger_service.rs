use crate::errors::CoreError;
use crate::models::asset::{Asset, AssetUniverse};
use crate::models::ledger::Ledger;
use crate::models::price::PriceState;
use crate::models::snapshot::{HoldingLine, LedgerSnapshot};
use crate::models::transaction::{TradeSide, Transaction};

/// Relative slack allowed when a sell exceeds the holding by float rounding.
const HOLDING_TOLERANCE: f64 = 1e-9;

/// Executes simulated trades against a `Ledger` at the last synchronized prices.
///
/// Pure business logic: no I/O, no locking. Every operation either applies
/// completely or returns an error with the ledger untouched.
pub struct LedgerService {
    universe: AssetUniverse,
}

impl LedgerService {
    pub fn new(universe: AssetUniverse) -> Self {
        Self { universe }
    }

    pub fn universe(&self) -> &AssetUniverse {
        &self.universe
    }

    /// Parse a user-typed quantity. Must be a finite number greater than zero.
    pub fn parse_quantity(raw: &str) -> Result<f64, CoreError> {
        let trimmed = raw.trim();
        let quantity: f64 = trimmed
            .parse()
            .map_err(|_| CoreError::InvalidQuantity(format!("{trimmed:?} is not a number")))?;
        Self::validate_quantity(quantity)
    }

    pub fn validate_quantity(quantity: f64) -> Result<f64, CoreError> {
        if !quantity.is_finite() {
            return Err(CoreError::InvalidQuantity(format!(
                "{quantity} is not a finite number"
            )));
        }
        if quantity <= 0.0 {
            return Err(CoreError::InvalidQuantity(format!(
                "quantity must be greater than zero, got {quantity}"
            )));
        }
        Ok(quantity)
    }

    /// Buy `quantity` of `symbol` with cash.
    ///
    /// Rules:
    /// - Symbol must be in the universe
    /// - Quantity must be finite and positive
    /// - A price must have been synchronized for the symbol
    /// - Cost may not exceed available cash
    pub fn buy(
        &self,
        ledger: &mut Ledger,
        prices: &PriceState,
        symbol: &str,
        quantity: f64,
    ) -> Result<Transaction, CoreError> {
        let (asset, quantity, price) = self.validate_trade(prices, symbol, quantity)?;

        let cost = quantity * price;
        if cost > ledger.cash_usd() {
            return Err(CoreError::InsufficientFunds {
                symbol: asset.symbol.clone(),
                cost,
                available: ledger.cash_usd(),
            });
        }

        let tx = Transaction::new(TradeSide::Buy, asset.symbol.clone(), quantity, price);
        ledger.debit(&asset.symbol, cost, quantity);
        ledger.record(tx.clone());
        Ok(tx)
    }

    /// Sell `quantity` of `symbol` for cash.
    ///
    /// Same validation as `buy`, plus: can't sell more than is held. A request
    /// that exceeds the holding only by rounding drift sells the whole holding.
    pub fn sell(
        &self,
        ledger: &mut Ledger,
        prices: &PriceState,
        symbol: &str,
        quantity: f64,
    ) -> Result<Transaction, CoreError> {
        let (asset, quantity, price) = self.validate_trade(prices, symbol, quantity)?;

        let held = ledger.holding(&asset.symbol);
        if quantity - held > held * HOLDING_TOLERANCE {
            return Err(CoreError::InsufficientHoldings {
                symbol: asset.symbol.clone(),
                requested: quantity,
                held,
            });
        }
        let quantity = quantity.min(held);

        let tx = Transaction::new(TradeSide::Sell, asset.symbol.clone(), quantity, price);
        ledger.credit(&asset.symbol, tx.amount_usd, quantity);
        ledger.record(tx.clone());
        Ok(tx)
    }

    /// Cash plus market value of every holding. Unknown prices count as zero.
    pub fn total_value(&self, ledger: &Ledger, prices: &PriceState) -> f64 {
        ledger.cash_usd()
            + ledger
                .holdings()
                .iter()
                .map(|(symbol, qty)| qty * prices.get_or_zero(symbol))
                .sum::<f64>()
    }

    pub fn snapshot(&self, ledger: &Ledger, prices: &PriceState) -> LedgerSnapshot {
        let holdings = self
            .universe
            .assets()
            .iter()
            .map(|asset| {
                let quantity = ledger.holding(&asset.symbol);
                let price = prices.get(&asset.symbol);
                HoldingLine {
                    symbol: asset.symbol.clone(),
                    name: asset.name.clone(),
                    quantity,
                    price,
                    value_usd: quantity * price.unwrap_or(0.0),
                }
            })
            .collect();

        LedgerSnapshot {
            cash_usd: ledger.cash_usd(),
            holdings,
            total_value: self.total_value(ledger, prices),
            trade_count: ledger.history().len(),
        }
    }

    /// Checks shared by buy and sell, in the order the user would want to hear about them.
    fn validate_trade<'a>(
        &'a self,
        prices: &PriceState,
        symbol: &str,
        quantity: f64,
    ) -> Result<(&'a Asset, f64, f64), CoreError> {
        let asset = self
            .universe
            .by_symbol(symbol)
            .ok_or_else(|| CoreError::UnknownAsset(symbol.to_string()))?;
        let quantity = Self::validate_quantity(quantity)?;
        let price = prices
            .get(&asset.symbol)
            .ok_or_else(|| CoreError::PriceUnavailable(asset.symbol.clone()))?;
        Ok((asset, quantity, price))
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new(AssetUniverse::default())
    }
}
