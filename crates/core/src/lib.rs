pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::{Arc, Mutex};

use models::{
    asset::AssetUniverse,
    chart::ChartSeries,
    event::SessionEvent,
    ledger::Ledger,
    price::RefreshReport,
    settings::Settings,
    snapshot::{LedgerSnapshot, PriceSnapshot},
    transaction::{TradeSide, Transaction},
};
use providers::{coingecko::CoinGeckoProvider, traits::PriceFeed};
use services::scheduler::{RefreshHandle, RefreshScheduler};
use services::{ledger_service::LedgerService, price_service::PriceSynchronizer};
use tokio::sync::broadcast;

use errors::CoreError;

/// Buffered notifications per subscriber before the slowest one starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Main entry point for the Paper Trader core library.
///
/// One value per session: owns the ledger, the price synchronizer and the
/// refresh loop. All methods take `&self`, so a session can be shared
/// behind an `Arc` between the refresh loop and whatever handles user input.
/// The ledger and the price table each sit behind their own lock; a trade
/// holds the ledger lock for its whole validate-and-apply step.
#[must_use]
pub struct PaperTrader {
    settings: Settings,
    ledger: Mutex<Ledger>,
    ledger_service: LedgerService,
    synchronizer: Arc<PriceSynchronizer>,
    events: broadcast::Sender<SessionEvent>,
    refresher: Mutex<Option<RefreshHandle>>,
}

impl std::fmt::Debug for PaperTrader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ledger = self.lock_ledger();
        f.debug_struct("PaperTrader")
            .field("cash_usd", &ledger.cash_usd())
            .field("trades", &ledger.history().len())
            .field("feed", &self.synchronizer.feed_name())
            .field("syncing", &self.is_syncing())
            .finish()
    }
}

impl PaperTrader {
    /// Start a session against an arbitrary price feed.
    pub fn new(settings: Settings, feed: Box<dyn PriceFeed>) -> Result<Self, CoreError> {
        settings.validate()?;
        let universe = AssetUniverse::default();
        let ledger = Ledger::new(&universe, settings.starting_cash_usd);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            ledger: Mutex::new(ledger),
            ledger_service: LedgerService::new(universe.clone()),
            synchronizer: Arc::new(PriceSynchronizer::new(feed, universe)),
            events,
            settings,
            refresher: Mutex::new(None),
        })
    }

    /// Start a session against CoinGecko, configured from `settings`.
    pub fn with_coingecko(settings: Settings) -> Result<Self, CoreError> {
        let feed = CoinGeckoProvider::from_settings(&settings);
        Self::new(settings, Box::new(feed))
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn universe(&self) -> &AssetUniverse {
        self.ledger_service.universe()
    }

    /// Receive session notifications (refreshes, trades, chart loads).
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // ── Price Synchronization ───────────────────────────────────────

    /// Start the periodic refresh loop (first refresh happens immediately).
    /// Does nothing if it is already running. Requires a tokio runtime.
    pub fn start_price_sync(&self) -> Result<(), CoreError> {
        let mut refresher = self.refresher.lock().unwrap_or_else(|e| e.into_inner());
        if refresher.as_ref().is_some_and(|h| h.is_running()) {
            return Ok(());
        }
        let handle = RefreshScheduler::start(
            Arc::clone(&self.synchronizer),
            self.settings.refresh_interval(),
            self.events.clone(),
        )?;
        *refresher = Some(handle);
        Ok(())
    }

    /// Stop the periodic refresh loop, if running.
    pub fn stop_price_sync(&self) {
        if let Some(mut handle) = self
            .refresher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.stop();
        }
    }

    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.refresher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|h| h.is_running())
    }

    /// Refresh prices right now, outside the schedule.
    pub async fn refresh_now(&self) -> Result<RefreshReport, CoreError> {
        let result = self.synchronizer.refresh_all().await;
        let event = match &result {
            Ok(report) => SessionEvent::PricesRefreshed(report.clone()),
            Err(e) => SessionEvent::RefreshFailed {
                message: e.to_string(),
            },
        };
        self.publish(event);
        result
    }

    /// Last synchronized price for `symbol`, if any.
    #[must_use]
    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.synchronizer.with_prices(|p| p.get(symbol))
    }

    /// Override one price by hand (offline use and tests).
    pub fn set_price(&self, symbol: &str, price: f64) -> Result<(), CoreError> {
        if self.universe().by_symbol(symbol).is_none() {
            return Err(CoreError::UnknownAsset(symbol.to_string()));
        }
        if !self.synchronizer.set_price(symbol, price) {
            return Err(CoreError::InvalidPrice(format!(
                "price for {symbol} must be finite and non-negative, got {price}"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn price_snapshot(&self) -> PriceSnapshot {
        self.synchronizer.with_prices(|prices| PriceSnapshot {
            prices: self
                .universe()
                .assets()
                .iter()
                .map(|a| (a.symbol.clone(), prices.get(&a.symbol)))
                .collect(),
            last_refreshed: prices.last_refreshed(),
        })
    }

    // ── Trading ─────────────────────────────────────────────────────

    /// Buy `quantity` of `symbol` at the last synchronized price.
    pub fn buy(&self, symbol: &str, quantity: f64) -> Result<Transaction, CoreError> {
        self.trade(TradeSide::Buy, symbol, Ok(quantity))
    }

    /// Sell `quantity` of `symbol` at the last synchronized price.
    pub fn sell(&self, symbol: &str, quantity: f64) -> Result<Transaction, CoreError> {
        self.trade(TradeSide::Sell, symbol, Ok(quantity))
    }

    /// Buy using a quantity typed by the user.
    pub fn buy_input(&self, symbol: &str, raw_quantity: &str) -> Result<Transaction, CoreError> {
        self.trade(TradeSide::Buy, symbol, self.input_quantity(symbol, raw_quantity))
    }

    /// Sell using a quantity typed by the user.
    pub fn sell_input(&self, symbol: &str, raw_quantity: &str) -> Result<Transaction, CoreError> {
        self.trade(TradeSide::Sell, symbol, self.input_quantity(symbol, raw_quantity))
    }

    // ── Holdings & Value ────────────────────────────────────────────

    #[must_use]
    pub fn cash_usd(&self) -> f64 {
        self.lock_ledger().cash_usd()
    }

    #[must_use]
    pub fn holding(&self, symbol: &str) -> f64 {
        self.lock_ledger().holding(symbol)
    }

    /// Cash plus market value of all holdings at current prices.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        let ledger = self.lock_ledger();
        self.synchronizer
            .with_prices(|prices| self.ledger_service.total_value(&ledger, prices))
    }

    #[must_use]
    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        let ledger = self.lock_ledger();
        self.synchronizer
            .with_prices(|prices| self.ledger_service.snapshot(&ledger, prices))
    }

    // ── History ─────────────────────────────────────────────────────

    /// All trades, newest first.
    #[must_use]
    pub fn history(&self) -> Vec<Transaction> {
        self.lock_ledger()
            .history_newest_first()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Trades for one symbol (case-insensitive), newest first.
    #[must_use]
    pub fn history_for(&self, symbol: &str) -> Vec<Transaction> {
        let upper = symbol.to_uppercase();
        self.lock_ledger()
            .history_newest_first()
            .into_iter()
            .filter(|tx| tx.symbol == upper)
            .cloned()
            .collect()
    }

    /// Export the trade history (oldest first) as pretty JSON.
    pub fn export_history_json(&self) -> Result<String, CoreError> {
        let ledger = self.lock_ledger();
        serde_json::to_string_pretty(ledger.history())
            .map_err(|e| CoreError::Serialization(format!("Failed to export history: {e}")))
    }

    /// Export the trade history (oldest first) as CSV.
    #[must_use]
    pub fn export_history_csv(&self) -> String {
        let ledger = self.lock_ledger();
        let mut csv = String::from("id,timestamp,side,symbol,quantity,price,amount_usd\n");
        for tx in ledger.history() {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                tx.id,
                tx.timestamp.to_rfc3339(),
                tx.side,
                tx.symbol,
                tx.quantity,
                tx.price,
                tx.amount_usd
            ));
        }
        csv
    }

    // ── Charts ──────────────────────────────────────────────────────

    /// Load the one-day hourly chart for `symbol` and make it current.
    ///
    /// A request overtaken by a newer one returns `Superseded` and publishes
    /// nothing. On feed failure the previous chart stays in place.
    pub async fn show_chart(&self, symbol: &str) -> Result<ChartSeries, CoreError> {
        let result = self.synchronizer.fetch_history(symbol).await;
        match &result {
            Ok(series) => self.publish(SessionEvent::ChartUpdated {
                symbol: series.asset.symbol.clone(),
            }),
            Err(CoreError::Superseded(_)) => {}
            Err(e) => self.publish(SessionEvent::ChartFailed {
                symbol: symbol.to_uppercase(),
                message: e.to_string(),
            }),
        }
        result
    }

    /// Hide the chart and discard any history request still in flight.
    pub fn hide_chart(&self) {
        self.synchronizer.clear_chart();
        self.publish(SessionEvent::ChartCleared);
    }

    #[must_use]
    pub fn current_chart(&self) -> Option<ChartSeries> {
        self.synchronizer.current_chart()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn trade(
        &self,
        side: TradeSide,
        symbol: &str,
        quantity: Result<f64, CoreError>,
    ) -> Result<Transaction, CoreError> {
        let result = quantity.and_then(|quantity| {
            let mut ledger = self.lock_ledger();
            self.synchronizer.with_prices(|prices| match side {
                TradeSide::Buy => self.ledger_service.buy(&mut ledger, prices, symbol, quantity),
                TradeSide::Sell => self.ledger_service.sell(&mut ledger, prices, symbol, quantity),
            })
        });

        match &result {
            Ok(tx) => {
                tracing::info!(side = %tx.side, symbol = %tx.symbol, "{}", tx.description());
                self.publish(SessionEvent::TradeExecuted(tx.clone()));
            }
            Err(e) => {
                tracing::info!(%side, symbol, "trade rejected: {e}");
                self.publish(SessionEvent::trade_rejected(e));
            }
        }
        result
    }

    /// Parse typed input, reporting an unknown symbol before a bad quantity.
    fn input_quantity(&self, symbol: &str, raw_quantity: &str) -> Result<f64, CoreError> {
        if self.universe().by_symbol(symbol).is_none() {
            return Err(CoreError::UnknownAsset(symbol.to_string()));
        }
        LedgerService::parse_quantity(raw_quantity)
    }

    fn publish(&self, event: SessionEvent) {
        // Err only means nobody is subscribed.
        let _ = self.events.send(event);
    }

    fn lock_ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }
}
