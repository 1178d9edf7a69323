//! Wire types of the market-data service

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::types::{InstrumentSnapshot, OiRanking};

/// Envelope around every service response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}

/// Snapshot response body
pub type SnapshotResponse = FeedEnvelope<InstrumentSnapshot>;

/// Open-interest leaderboard body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OiTopData {
    #[serde(default)]
    pub positions: Vec<OiTopPosition>,
    /// Window the deltas were computed over, e.g. "1h"
    #[serde(default)]
    pub time_range: Option<String>,
}

pub type OiTopResponse = FeedEnvelope<OiTopData>;

/// One leaderboard row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OiTopPosition {
    pub symbol: String,
    pub rank: u32,
    #[serde(default)]
    pub current_oi: Decimal,
    pub oi_delta: Decimal,
    pub oi_delta_percent: Decimal,
    pub oi_delta_value: Decimal,
    pub price_delta_percent: Decimal,
    #[serde(default)]
    pub net_long: Decimal,
    #[serde(default)]
    pub net_short: Decimal,
}

impl From<OiTopPosition> for OiRanking {
    fn from(p: OiTopPosition) -> Self {
        OiRanking {
            symbol: p.symbol,
            rank: p.rank,
            oi_delta_percent: p.oi_delta_percent,
            oi_delta_value: p.oi_delta_value,
            price_delta_percent: p.price_delta_percent,
            net_long: p.net_long,
            net_short: p.net_short,
        }
    }
}
