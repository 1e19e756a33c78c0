use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;

use super::ledger::DEFAULT_STARTING_CASH_USD;

pub const DEFAULT_FEED_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable prefix used by `Settings::from_env`.
pub const ENV_PREFIX: &str = "PAPER_TRADER_";

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cash balance a new session starts with.
    pub starting_cash_usd: f64,

    /// Seconds between automatic price refreshes.
    pub refresh_interval_secs: u64,

    /// Base URL of the CoinGecko-compatible price API.
    pub feed_base_url: String,

    /// HTTP request timeout in seconds (native only).
    pub request_timeout_secs: u64,

    /// Quote currency requested from the feed (lowercase, e.g. "usd").
    pub quote_currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_cash_usd: DEFAULT_STARTING_CASH_USD,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            quote_currency: "usd".to_string(),
        }
    }
}

impl Settings {
    /// Defaults overlaid with `PAPER_TRADER_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup` (handy for tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(raw) = var("STARTING_CASH") {
            match raw.trim().parse::<f64>() {
                Ok(v) => settings.starting_cash_usd = v,
                Err(e) => tracing::warn!("ignoring {ENV_PREFIX}STARTING_CASH={raw:?}: {e}"),
            }
        }
        if let Some(raw) = var("REFRESH_INTERVAL_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(v) => settings.refresh_interval_secs = v,
                Err(e) => tracing::warn!("ignoring {ENV_PREFIX}REFRESH_INTERVAL_SECS={raw:?}: {e}"),
            }
        }
        if let Some(raw) = var("REQUEST_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(v) => settings.request_timeout_secs = v,
                Err(e) => tracing::warn!("ignoring {ENV_PREFIX}REQUEST_TIMEOUT_SECS={raw:?}: {e}"),
            }
        }
        if let Some(raw) = var("FEED_URL") {
            let trimmed = raw.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                settings.feed_base_url = trimmed.to_string();
            }
        }
        if let Some(raw) = var("QUOTE_CURRENCY") {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                settings.quote_currency = trimmed.to_lowercase();
            }
        }
        settings
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.starting_cash_usd.is_finite() || self.starting_cash_usd < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "starting cash must be a non-negative number, got {}",
                self.starting_cash_usd
            )));
        }
        if self.refresh_interval_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "refresh interval must be at least one second".into(),
            ));
        }
        if self.feed_base_url.is_empty() {
            return Err(CoreError::InvalidConfig("feed base URL is empty".into()));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
