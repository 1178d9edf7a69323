//! Common test utilities and fixtures

#![allow(dead_code)]

use llm_decision_core::config::types::RiskConfig;
use llm_decision_core::{LeverageCeilings, ValidationLimits};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

/// Default risk limits shared by every test
pub static RISK: Lazy<RiskConfig> = Lazy::new(RiskConfig::default);

/// Limits for a 5000 equity account with a major-pair ceiling of 5
pub fn sample_limits() -> ValidationLimits {
    ValidationLimits::new(dec!(5000), LeverageCeilings { major: 5, other: 3 }, &RISK)
}

/// Sample model responses
pub mod responses {
    /// A single valid ETH long
    pub const ETH_LONG: &str = r#"rationale text [{"symbol":"ETHUSDT","action":"open_long","leverage":3,"position_size_usd":500,"stop_loss":3735,"take_profit_levels":[3966,4081,4197],"reasoning":"x"}]"#;

    /// Same long with a second target below the first
    pub const ETH_LONG_BAD_ORDER: &str = r#"rationale text [{"symbol":"ETHUSDT","action":"open_long","leverage":3,"position_size_usd":500,"stop_loss":3735,"take_profit_levels":[3966,3900,4197],"reasoning":"x"}]"#;

    /// Array never closed
    pub const UNTERMINATED: &str = r#"rationale text [{"symbol":"ETHUSDT","action":"wait","reasoning":"x"}"#;

    /// A realistic mixed batch with chain-of-thought text
    pub const MIXED_BATCH: &str = r#"## Market overview
BTC is consolidating under resistance; funding is flat. SOL open interest
is up 14% in the hour while price lags [bullish divergence].

## Positions
Holding DOGE long, trail the stop.

```json
[
  {"symbol": "SOLUSDT", "action": "open_short", "leverage": 3, "position_size_usd": 600,
   "stop_loss": 160, "take_profit_levels": [150, 140, 130], "checklist_passed": 6,
   "risk_reward_ratio": 4.0, "signal_type": "breakdown", "oi_signal": "distribution",
   "reasoning": "lower highs on 15m"},
  {"symbol": "DOGEUSDT", "action": "update_stop", "new_stop_loss": 0.1725, "reasoning": "trail"},
  {"symbol": "XRPUSDT", "action": "partial_close", "close_percentage": 30, "reasoning": "take some"},
  {"action": "wait", "reasoning": "nothing else qualifies"}
]
```"#;
}
