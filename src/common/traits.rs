//! Trait definitions for external data collaborators

use async_trait::async_trait;

use super::errors::Result;
use super::types::{InstrumentSnapshot, OiRanking};

/// Source of per-symbol market data
///
/// Implementations must be safe to call concurrently: the context
/// assembler issues one request per symbol through a bounded pool.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the current snapshot for a symbol
    ///
    /// # Arguments
    /// * `symbol` - Instrument symbol (e.g., "BTCUSDT")
    async fn fetch_snapshot(&self, symbol: &str) -> Result<InstrumentSnapshot>;
}

/// Source of open-interest growth rankings
///
/// Optional input: callers treat a failure as "no ranking data".
#[async_trait]
pub trait OpenInterestRankingSource: Send + Sync {
    /// Fetch the current ranking list
    async fn fetch_rankings(&self) -> Result<Vec<OiRanking>>;
}
