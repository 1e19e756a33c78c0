use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the entire paper-trader-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// None of these are fatal: a failed operation leaves the session state
/// exactly as it was before the call.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Trading / Business Logic ────────────────────────────────────
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Insufficient funds: {symbol} costs {cost:.2} USD but only {available:.2} USD is available")]
    InsufficientFunds {
        symbol: String,
        cost: f64,
        available: f64,
    },

    #[error("Insufficient holdings: cannot sell {requested:.4} {symbol}, only {held:.4} held")]
    InsufficientHoldings {
        symbol: String,
        requested: f64,
        held: f64,
    },

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("No price has been synchronized yet for {0}")]
    PriceUnavailable(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    // ── Price Feed / Network ────────────────────────────────────────
    #[error("Price feed unavailable ({provider}): {message}")]
    FeedUnavailable {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("History request for {0} was superseded by a newer request")]
    Superseded(String),

    // ── Export ──────────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── Configuration / Runtime ─────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

/// Coarse classification of a `CoreError`, handed to the view layer
/// together with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidQuantity,
    InsufficientFunds,
    InsufficientHoldings,
    UnknownAsset,
    PriceUnavailable,
    InvalidPrice,
    FeedUnavailable,
    Superseded,
    Serialization,
    InvalidConfig,
    Scheduler,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
            CoreError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            CoreError::InsufficientHoldings { .. } => ErrorKind::InsufficientHoldings,
            CoreError::UnknownAsset(_) => ErrorKind::UnknownAsset,
            CoreError::PriceUnavailable(_) => ErrorKind::PriceUnavailable,
            CoreError::InvalidPrice(_) => ErrorKind::InvalidPrice,
            // Transport and parse failures both mean "the feed could not answer".
            CoreError::FeedUnavailable { .. }
            | CoreError::Network(_)
            | CoreError::Deserialization(_) => ErrorKind::FeedUnavailable,
            CoreError::Superseded(_) => ErrorKind::Superseded,
            CoreError::Serialization(_) => ErrorKind::Serialization,
            CoreError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            CoreError::Scheduler(_) => ErrorKind::Scheduler,
        }
    }

    /// True for errors caused by user input or the ledger's economic rules.
    pub fn is_trade_rejection(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidQuantity
                | ErrorKind::InsufficientFunds
                | ErrorKind::InsufficientHoldings
                | ErrorKind::UnknownAsset
                | ErrorKind::PriceUnavailable
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full request URL; keep the path, drop the query.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
