use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, ErrorKind};

use super::price::RefreshReport;
use super::transaction::Transaction;

/// Notification published by a session for the view layer.
///
/// Views subscribe with `PaperTrader::subscribe` and re-render on whatever
/// they care about; the core never calls into the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A refresh succeeded (possibly with some coins missing).
    PricesRefreshed(RefreshReport),
    /// A refresh failed; prices are unchanged.
    RefreshFailed { message: String },
    /// A buy or sell was applied to the ledger.
    TradeExecuted(Transaction),
    /// A buy or sell was rejected; the ledger is unchanged.
    TradeRejected { kind: ErrorKind, message: String },
    /// A new chart series is available for `symbol`.
    ChartUpdated { symbol: String },
    /// History could not be loaded; the previous chart is kept.
    ChartFailed { symbol: String, message: String },
    /// The chart was hidden.
    ChartCleared,
}

impl SessionEvent {
    pub fn trade_rejected(err: &CoreError) -> Self {
        SessionEvent::TradeRejected {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
