use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::chart::HistoryWindow;
use crate::models::price::{PricePoint, PriceQuotes};

/// Trait abstraction for a read-only market price feed.
///
/// The synchronizer only talks to this trait, so the HTTP feed can be
/// replaced (or mocked in tests) without touching the ledger or scheduler.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Human-readable name of this feed (for logs/errors).
    fn name(&self) -> &str;

    /// Current USD price for a batch of feed ids, in a single request.
    ///
    /// Ids the feed has no quote for are simply absent from the result.
    async fn get_current_prices(&self, ids: &[String]) -> Result<PriceQuotes, CoreError>;

    /// Time-ordered USD samples for one feed id over `window`.
    async fn get_history(
        &self,
        id: &str,
        window: HistoryWindow,
    ) -> Result<Vec<PricePoint>, CoreError>;
}
