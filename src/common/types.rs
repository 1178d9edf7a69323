//! Domain records shared by the context assembler and the decision pipeline

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a position or of an opening decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Long => write!(f, "long"),
            PositionSide::Short => write!(f, "short"),
        }
    }
}

/// Latest open-interest reading for an instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenInterest {
    /// Outstanding contracts, in base-asset quantity
    pub latest: Decimal,
    /// Average over the feed's lookback window
    #[serde(default)]
    pub average: Decimal,
    /// Change versus the previous reading, in percent
    #[serde(default)]
    pub delta_pct: Decimal,
}

/// Market data for one symbol, as published by the data feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    pub symbol: String,
    pub current_price: Decimal,
    /// Short horizon price change in percent
    #[serde(default)]
    pub price_change_1h: Decimal,
    /// Medium horizon price change in percent
    #[serde(default)]
    pub price_change_4h: Decimal,
    /// Long horizon price change in percent
    #[serde(default)]
    pub price_change_24h: Decimal,
    #[serde(default)]
    pub macd: Decimal,
    #[serde(default)]
    pub rsi7: Decimal,
    #[serde(default)]
    pub open_interest: Option<OpenInterest>,
    #[serde(default)]
    pub funding_rate: Decimal,
}

impl InstrumentSnapshot {
    /// Open interest valued at the current price, in millions of quote currency.
    ///
    /// `None` when the feed did not report open interest or the price is not
    /// positive; such snapshots cannot be judged against a liquidity floor.
    pub fn open_interest_notional_millions(&self) -> Option<Decimal> {
        let oi = self.open_interest.as_ref()?;
        if self.current_price <= Decimal::ZERO {
            return None;
        }
        Some(oi.latest * self.current_price / Decimal::from(1_000_000))
    }
}

/// Account state at the start of a cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub total_equity: Decimal,
    pub available_balance: Decimal,
    #[serde(default)]
    pub total_pnl: Decimal,
    #[serde(default)]
    pub total_pnl_pct: Decimal,
    #[serde(default)]
    pub margin_used: Decimal,
    #[serde(default)]
    pub margin_used_pct: Decimal,
    #[serde(default)]
    pub position_count: u32,
}

/// An open position, supplied by the execution side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub symbol: String,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub mark_price: Decimal,
    pub quantity: Decimal,
    pub leverage: u32,
    pub unrealized_pnl: Decimal,
    pub unrealized_pnl_pct: Decimal,
    pub liquidation_price: Decimal,
    pub margin_used: Decimal,
    /// Last update, milliseconds since the Unix epoch
    #[serde(default)]
    pub update_time: i64,
}

/// Signal that nominated a candidate symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateSource {
    /// External score ranking
    #[serde(rename = "ai500")]
    Ranking,
    /// Open-interest growth leaderboard
    #[serde(rename = "oi_top")]
    OpenInterestGrowth,
}

/// A ranked candidate symbol; list order is evaluation priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub symbol: String,
    #[serde(default)]
    pub sources: Vec<CandidateSource>,
}

impl CandidateEntry {
    pub fn new(symbol: impl Into<String>, sources: Vec<CandidateSource>) -> Self {
        Self {
            symbol: symbol.into(),
            sources,
        }
    }
}

/// Open-interest growth ranking entry for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OiRanking {
    pub symbol: String,
    pub rank: u32,
    /// One hour open-interest change in percent
    pub oi_delta_percent: Decimal,
    /// One hour open-interest change in quote currency
    pub oi_delta_value: Decimal,
    pub price_delta_percent: Decimal,
    #[serde(default)]
    pub net_long: Decimal,
    #[serde(default)]
    pub net_short: Decimal,
}

/// Externally configured leverage ceilings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverageCeilings {
    /// Ceiling for major pairs (BTC/ETH by default)
    pub major: u32,
    /// Ceiling for every other instrument
    pub other: u32,
}

impl Default for LeverageCeilings {
    fn default() -> Self {
        Self { major: 5, other: 5 }
    }
}

/// Inputs for one evaluation cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleInput {
    #[serde(default = "Utc::now")]
    pub current_time: DateTime<Utc>,
    #[serde(default)]
    pub call_count: u64,
    #[serde(default)]
    pub runtime_minutes: u64,
    pub account: AccountSnapshot,
    #[serde(default)]
    pub positions: Vec<PositionRecord>,
    #[serde(default)]
    pub candidates: Vec<CandidateEntry>,
    #[serde(default)]
    pub leverage: LeverageCeilings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(price: Decimal, oi: Option<Decimal>) -> InstrumentSnapshot {
        InstrumentSnapshot {
            symbol: "SOLUSDT".to_string(),
            current_price: price,
            price_change_1h: Decimal::ZERO,
            price_change_4h: Decimal::ZERO,
            price_change_24h: Decimal::ZERO,
            macd: Decimal::ZERO,
            rsi7: Decimal::ZERO,
            open_interest: oi.map(|latest| OpenInterest {
                latest,
                average: latest,
                delta_pct: Decimal::ZERO,
            }),
            funding_rate: Decimal::ZERO,
        }
    }

    #[test]
    fn test_notional_millions() {
        let snap = snapshot(dec!(150), Some(dec!(100000)));
        assert_eq!(snap.open_interest_notional_millions(), Some(dec!(15)));
    }

    #[test]
    fn test_notional_requires_open_interest_and_price() {
        assert_eq!(snapshot(dec!(150), None).open_interest_notional_millions(), None);
        assert_eq!(
            snapshot(Decimal::ZERO, Some(dec!(100))).open_interest_notional_millions(),
            None
        );
    }

    #[test]
    fn test_candidate_sources_wire_names() {
        let entry: CandidateEntry =
            serde_json::from_str(r#"{"symbol":"DOGEUSDT","sources":["ai500","oi_top"]}"#).unwrap();
        assert_eq!(
            entry.sources,
            vec![CandidateSource::Ranking, CandidateSource::OpenInterestGrowth]
        );
    }

    #[test]
    fn test_cycle_input_defaults() {
        let input: CycleInput =
            serde_json::from_str(r#"{"account":{"total_equity":5000,"available_balance":4000}}"#)
                .unwrap();
        assert!(input.positions.is_empty());
        assert_eq!(input.leverage, LeverageCeilings::default());
        assert_eq!(input.account.total_equity, dec!(5000));
    }
}
