//! Builds the per-cycle evaluation context

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

use crate::common::traits::{MarketDataProvider, OpenInterestRankingSource};
use crate::common::types::{
    AccountSnapshot, CandidateEntry, CycleInput, InstrumentSnapshot, LeverageCeilings, OiRanking,
    PositionRecord,
};
use crate::config::types::{FeedConfig, RiskConfig};
use crate::decision::validator::ValidationLimits;

/// Everything known about the market and account for one cycle.
///
/// Built once by [`ContextAssembler::assemble`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub current_time: DateTime<Utc>,
    pub call_count: u64,
    pub runtime_minutes: u64,
    pub account: AccountSnapshot,
    pub positions: Vec<PositionRecord>,
    pub candidates: Vec<CandidateEntry>,
    /// Absent for symbols whose fetch failed or that fell below the floor
    pub snapshots: HashMap<String, InstrumentSnapshot>,
    pub oi_rankings: HashMap<String, OiRanking>,
    pub leverage: LeverageCeilings,
}

impl EvaluationContext {
    /// A context carrying only the cycle inputs, with no market data
    pub fn from_input(input: CycleInput) -> Self {
        Self {
            current_time: input.current_time,
            call_count: input.call_count,
            runtime_minutes: input.runtime_minutes,
            account: input.account,
            positions: input.positions,
            candidates: input.candidates,
            snapshots: HashMap::new(),
            oi_rankings: HashMap::new(),
            leverage: input.leverage,
        }
    }

    /// Validator limits for this cycle's equity and leverage ceilings
    pub fn validation_limits(&self, risk: &RiskConfig) -> ValidationLimits {
        ValidationLimits::new(self.account.total_equity, self.leverage, risk)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.iter().any(|p| p.symbol == symbol)
    }

    /// Candidates that survived fetching and filtering, in ranking order
    pub fn evaluated_candidates(&self) -> impl Iterator<Item = &CandidateEntry> {
        self.candidates
            .iter()
            .filter(|c| self.snapshots.contains_key(&c.symbol))
    }
}

/// Assembler tuning
#[derive(Debug, Clone)]
pub struct AssemblerSettings {
    /// Minimum open-interest notional, in millions, for non-position symbols
    pub liquidity_floor_millions: Decimal,
    /// Upper bound on concurrent snapshot fetches
    pub max_concurrent_fetches: usize,
}

impl From<&FeedConfig> for AssemblerSettings {
    fn from(feed: &FeedConfig) -> Self {
        Self {
            liquidity_floor_millions: feed.liquidity_floor_millions,
            max_concurrent_fetches: feed.max_concurrent_fetches.max(1),
        }
    }
}

impl Default for AssemblerSettings {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

/// Symbols to evaluate: every open position, then every candidate, deduplicated.
pub fn symbols_to_evaluate(
    positions: &[PositionRecord],
    candidates: &[CandidateEntry],
) -> Vec<String> {
    let mut seen = HashSet::new();
    positions
        .iter()
        .map(|p| &p.symbol)
        .chain(candidates.iter().map(|c| &c.symbol))
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// Whether a non-position symbol has enough open interest to be evaluated.
///
/// Snapshots without open interest or price cannot be judged and pass.
pub fn passes_liquidity_floor(snapshot: &InstrumentSnapshot, floor_millions: Decimal) -> bool {
    match snapshot.open_interest_notional_millions() {
        Some(millions) => millions >= floor_millions,
        None => true,
    }
}

/// Gathers market data for a cycle from the external collaborators
pub struct ContextAssembler<P, R> {
    provider: P,
    rankings: R,
    settings: AssemblerSettings,
}

impl<P, R> ContextAssembler<P, R>
where
    P: MarketDataProvider,
    R: OpenInterestRankingSource,
{
    pub fn new(provider: P, rankings: R, settings: AssemblerSettings) -> Self {
        Self {
            provider,
            rankings,
            settings,
        }
    }

    /// Fetch snapshots and rankings and publish the cycle's context.
    ///
    /// Per-symbol failures only drop that symbol; ranking failures only
    /// leave the ranking map empty.
    #[instrument(skip(self, input), fields(cycle = input.call_count))]
    pub async fn assemble(&self, input: CycleInput) -> EvaluationContext {
        let symbols = symbols_to_evaluate(&input.positions, &input.candidates);
        let position_symbols: HashSet<&str> =
            input.positions.iter().map(|p| p.symbol.as_str()).collect();

        let provider = &self.provider;
        let fetched: Vec<(String, Option<InstrumentSnapshot>)> = stream::iter(symbols)
            .map(|symbol| async move {
                match provider.fetch_snapshot(&symbol).await {
                    Ok(snapshot) => (symbol, Some(snapshot)),
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "market data unavailable, skipping");
                        (symbol, None)
                    }
                }
            })
            .buffer_unordered(self.settings.max_concurrent_fetches)
            .collect()
            .await;

        let requested = fetched.len();
        let mut snapshots = HashMap::with_capacity(requested);
        for (symbol, snapshot) in fetched {
            let Some(snapshot) = snapshot else { continue };

            // Open positions are always evaluated so they can be closed.
            if !position_symbols.contains(symbol.as_str())
                && !passes_liquidity_floor(&snapshot, self.settings.liquidity_floor_millions)
            {
                let millions = snapshot.open_interest_notional_millions().unwrap_or_default();
                let oi = snapshot
                    .open_interest
                    .as_ref()
                    .map(|o| o.latest)
                    .unwrap_or_default();
                warn!(
                    symbol = %symbol,
                    "open interest value too low ({:.2}M < {}M), skipping [open interest: {} x price: {}]",
                    millions,
                    self.settings.liquidity_floor_millions,
                    oi,
                    snapshot.current_price
                );
                continue;
            }

            snapshots.insert(symbol, snapshot);
        }

        let oi_rankings = match self.rankings.fetch_rankings().await {
            Ok(list) => list.into_iter().map(|r| (r.symbol.clone(), r)).collect(),
            Err(e) => {
                debug!(error = %e, "open interest ranking unavailable");
                HashMap::new()
            }
        };

        info!(
            requested,
            evaluated = snapshots.len(),
            rankings = oi_rankings.len(),
            "evaluation context assembled"
        );

        let mut context = EvaluationContext::from_input(input);
        context.snapshots = snapshots;
        context.oi_rankings = oi_rankings;
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::{ClientError, Result};
    use crate::common::types::{CandidateSource, OpenInterest, PositionSide};
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::{eq, ne};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    mock! {
        pub Feed {}

        #[async_trait]
        impl MarketDataProvider for Feed {
            async fn fetch_snapshot(&self, symbol: &str) -> Result<InstrumentSnapshot>;
        }
    }

    mock! {
        pub Rankings {}

        #[async_trait]
        impl OpenInterestRankingSource for Rankings {
            async fn fetch_rankings(&self) -> Result<Vec<OiRanking>>;
        }
    }

    fn snapshot(symbol: &str, price: Decimal, oi: Decimal) -> InstrumentSnapshot {
        InstrumentSnapshot {
            symbol: symbol.to_string(),
            current_price: price,
            price_change_1h: dec!(0.5),
            price_change_4h: dec!(1.2),
            price_change_24h: dec!(-2.0),
            macd: dec!(0.01),
            rsi7: dec!(55),
            open_interest: Some(OpenInterest {
                latest: oi,
                average: oi,
                delta_pct: Decimal::ZERO,
            }),
            funding_rate: dec!(0.0001),
        }
    }

    fn position(symbol: &str) -> PositionRecord {
        PositionRecord {
            symbol: symbol.to_string(),
            side: PositionSide::Long,
            entry_price: dec!(1),
            mark_price: dec!(1),
            quantity: dec!(100),
            leverage: 3,
            unrealized_pnl: Decimal::ZERO,
            unrealized_pnl_pct: Decimal::ZERO,
            liquidation_price: dec!(0.5),
            margin_used: dec!(33),
            update_time: 0,
        }
    }

    fn input(positions: Vec<PositionRecord>, candidates: &[&str]) -> CycleInput {
        CycleInput {
            current_time: Utc::now(),
            call_count: 7,
            runtime_minutes: 21,
            account: AccountSnapshot {
                total_equity: dec!(5000),
                available_balance: dec!(4000),
                ..AccountSnapshot::default()
            },
            positions,
            candidates: candidates
                .iter()
                .map(|s| CandidateEntry::new(*s, vec![CandidateSource::Ranking]))
                .collect(),
            leverage: LeverageCeilings::default(),
        }
    }

    fn rankings_unavailable() -> MockRankings {
        let mut rankings = MockRankings::new();
        rankings
            .expect_fetch_rankings()
            .returning(|| Err(ClientError::Timeout("ranking".to_string())));
        rankings
    }

    #[test]
    fn test_symbols_deduplicated_positions_first() {
        let positions = vec![position("SOLUSDT")];
        let candidates = vec![
            CandidateEntry::new("BTCUSDT", vec![]),
            CandidateEntry::new("SOLUSDT", vec![]),
            CandidateEntry::new("DOGEUSDT", vec![]),
        ];
        assert_eq!(
            symbols_to_evaluate(&positions, &candidates),
            vec!["SOLUSDT", "BTCUSDT", "DOGEUSDT"]
        );
    }

    #[test]
    fn test_liquidity_floor_boundary() {
        // 1,000,000 contracts at 15 = 15M exactly
        assert!(passes_liquidity_floor(&snapshot("A", dec!(15), dec!(1000000)), dec!(15)));
        // 14,999,999 notional
        assert!(!passes_liquidity_floor(&snapshot("B", dec!(1), dec!(14999999)), dec!(15)));
    }

    #[test_log::test(tokio::test)]
    async fn test_liquidity_filter_exempts_positions() {
        let mut feed = MockFeed::new();
        feed.expect_fetch_snapshot()
            .with(eq("THINUSDT"))
            .returning(|s| Ok(snapshot(s, dec!(1), dec!(14999999))));
        feed.expect_fetch_snapshot()
            .with(eq("EXACTUSDT"))
            .returning(|s| Ok(snapshot(s, dec!(1), dec!(15000000))));
        feed.expect_fetch_snapshot()
            .with(eq("HELDUSDT"))
            .returning(|s| Ok(snapshot(s, dec!(1), dec!(10))));

        let assembler =
            ContextAssembler::new(feed, rankings_unavailable(), AssemblerSettings::default());
        let ctx = assembler
            .assemble(input(vec![position("HELDUSDT")], &["THINUSDT", "EXACTUSDT"]))
            .await;

        assert!(ctx.snapshots.contains_key("HELDUSDT"));
        assert!(ctx.snapshots.contains_key("EXACTUSDT"));
        assert!(!ctx.snapshots.contains_key("THINUSDT"));
        assert!(ctx.oi_rankings.is_empty());
        assert_eq!(
            ctx.evaluated_candidates().map(|c| c.symbol.as_str()).collect::<Vec<_>>(),
            vec!["EXACTUSDT"]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_only_that_symbol() {
        let mut feed = MockFeed::new();
        feed.expect_fetch_snapshot()
            .with(eq("BADUSDT"))
            .returning(|s| Err(ClientError::SymbolNotFound(s.to_string())));
        feed.expect_fetch_snapshot()
            .with(ne("BADUSDT"))
            .returning(|s| Ok(snapshot(s, dec!(100), dec!(1000000))));

        let assembler =
            ContextAssembler::new(feed, rankings_unavailable(), AssemblerSettings::default());
        let ctx = assembler
            .assemble(input(vec![], &["BTCUSDT", "BADUSDT", "ETHUSDT"]))
            .await;

        let mut symbols: Vec<_> = ctx.snapshots.keys().cloned().collect();
        symbols.sort();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(ctx.call_count, 7);
        assert_eq!(ctx.account.total_equity, dec!(5000));
    }

    #[tokio::test]
    async fn test_rankings_merged_by_symbol() {
        let mut feed = MockFeed::new();
        feed.expect_fetch_snapshot()
            .returning(|s| Ok(snapshot(s, dec!(100), dec!(1000000))));

        let mut rankings = MockRankings::new();
        rankings.expect_fetch_rankings().times(1).returning(|| {
            Ok(vec![OiRanking {
                symbol: "PEPEUSDT".to_string(),
                rank: 1,
                oi_delta_percent: dec!(12.5),
                oi_delta_value: dec!(2500000),
                price_delta_percent: dec!(3.1),
                net_long: dec!(0),
                net_short: dec!(0),
            }])
        });

        let assembler = ContextAssembler::new(
            feed,
            rankings,
            AssemblerSettings {
                liquidity_floor_millions: dec!(15),
                max_concurrent_fetches: 1,
            },
        );
        let ctx = assembler.assemble(input(vec![], &["PEPEUSDT"])).await;

        assert_eq!(ctx.oi_rankings["PEPEUSDT"].rank, 1);
        assert!(ctx.snapshots.contains_key("PEPEUSDT"));
    }

    #[test]
    fn test_validation_limits_from_context() {
        let ctx = EvaluationContext::from_input(input(vec![position("SOLUSDT")], &[]));
        let limits = ctx.validation_limits(&RiskConfig::default());
        assert_eq!(limits.account_equity, dec!(5000));
        assert_eq!(limits.leverage, LeverageCeilings::default());
        assert!(ctx.has_position("SOLUSDT"));
    }
}
