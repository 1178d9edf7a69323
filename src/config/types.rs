//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::types::LeverageCeilings;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Decision invariant limits
    #[serde(default)]
    pub risk: RiskConfig,
    /// External market-data feed
    #[serde(default)]
    pub feed: FeedConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Limits applied by the decision validator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Leverage ceiling for major pairs
    #[serde(default = "default_max_leverage")]
    pub major_max_leverage: u32,
    /// Leverage ceiling for all other instruments
    #[serde(default = "default_max_leverage")]
    pub other_max_leverage: u32,
    /// Symbols treated as major pairs
    #[serde(default = "default_major_symbols")]
    pub major_symbols: Vec<String>,
    /// Notional cap for major pairs, as a multiple of account equity
    #[serde(default = "default_major_notional_multiple")]
    pub major_notional_multiple: Decimal,
    /// Notional cap for other instruments, as a multiple of account equity
    #[serde(default = "default_other_notional_multiple")]
    pub other_notional_multiple: Decimal,
    /// Fraction of the cap tolerated above it (rounding slack)
    #[serde(default = "default_notional_tolerance")]
    pub notional_tolerance: Decimal,
    /// Where the assumed entry sits between stop and first target (0..1)
    #[serde(default = "default_assumed_entry_fraction")]
    pub assumed_entry_fraction: Decimal,
    /// Minimum accepted reward:risk ratio
    #[serde(default = "default_min_risk_reward")]
    pub min_risk_reward: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            major_max_leverage: default_max_leverage(),
            other_max_leverage: default_max_leverage(),
            major_symbols: default_major_symbols(),
            major_notional_multiple: default_major_notional_multiple(),
            other_notional_multiple: default_other_notional_multiple(),
            notional_tolerance: default_notional_tolerance(),
            assumed_entry_fraction: default_assumed_entry_fraction(),
            min_risk_reward: default_min_risk_reward(),
        }
    }
}

impl RiskConfig {
    pub fn leverage_ceilings(&self) -> LeverageCeilings {
        LeverageCeilings {
            major: self.major_max_leverage,
            other: self.other_max_leverage,
        }
    }
}

fn default_max_leverage() -> u32 {
    5
}

fn default_major_symbols() -> Vec<String> {
    vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]
}

fn default_major_notional_multiple() -> Decimal {
    dec!(10)
}

fn default_other_notional_multiple() -> Decimal {
    dec!(1.5)
}

fn default_notional_tolerance() -> Decimal {
    dec!(0.01)
}

fn default_assumed_entry_fraction() -> Decimal {
    dec!(0.2)
}

fn default_min_risk_reward() -> Decimal {
    dec!(2.0)
}

/// External data feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the market-data service; no context assembly when unset
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Upper bound on in-flight snapshot requests
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Minimum open-interest notional (millions) for non-position symbols
    #[serde(default = "default_liquidity_floor_millions")]
    pub liquidity_floor_millions: Decimal,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_seconds: default_request_timeout(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            liquidity_floor_millions: default_liquidity_floor_millions(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_concurrent_fetches() -> usize {
    8
}

fn default_liquidity_floor_millions() -> Decimal {
    dec!(15)
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
