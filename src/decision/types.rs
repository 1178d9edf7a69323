//! Decision records: the flat wire shape and the validated sum type

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::common::types::PositionSide;

/// One decision object exactly as the model emits it.
///
/// Every field is optional at this layer; which fields an action needs is
/// checked by the validator, not by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDecision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reasoning: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leverage: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_size_usd: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub take_profit_levels: Vec<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist_passed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reward_ratio: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oi_signal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oi_adjustment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_stop_loss: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_percentage: Option<i64>,
}

/// Treat an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl RawDecision {
    /// Symbol with surrounding whitespace removed, `None` when blank
    pub fn symbol(&self) -> Option<&str> {
        self.symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Recognized action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
    UpdateStop,
    PartialClose,
    Hold,
    Wait,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::OpenLong => "open_long",
            ActionKind::OpenShort => "open_short",
            ActionKind::CloseLong => "close_long",
            ActionKind::CloseShort => "close_short",
            ActionKind::UpdateStop => "update_stop",
            ActionKind::PartialClose => "partial_close",
            ActionKind::Hold => "hold",
            ActionKind::Wait => "wait",
        }
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open_long" => Ok(ActionKind::OpenLong),
            "open_short" => Ok(ActionKind::OpenShort),
            "close_long" => Ok(ActionKind::CloseLong),
            "close_short" => Ok(ActionKind::CloseShort),
            "update_stop" => Ok(ActionKind::UpdateStop),
            "partial_close" => Ok(ActionKind::PartialClose),
            "hold" => Ok(ActionKind::Hold),
            "wait" => Ok(ActionKind::Wait),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated instruction to open a position
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrder {
    pub symbol: String,
    pub side: PositionSide,
    pub leverage: u32,
    pub position_size_usd: Decimal,
    pub stop_loss: Decimal,
    /// Strictly ordered away from the stop
    pub take_profit_levels: [Decimal; 3],
    pub trailing_stop_pct: Option<Decimal>,
    pub checklist_passed: Option<i64>,
    /// Ratio claimed by the model; the validator computes its own
    pub risk_reward_ratio: Option<Decimal>,
    pub signal_type: Option<String>,
    pub oi_signal: Option<String>,
    pub oi_adjustment: Option<String>,
    pub reasoning: String,
}

/// A validated decision, one variant per action kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "RawDecision")]
pub enum Decision {
    Open(OpenOrder),
    Close {
        symbol: String,
        side: PositionSide,
        reasoning: String,
    },
    UpdateStop {
        symbol: String,
        new_stop_loss: Decimal,
        reasoning: String,
    },
    PartialClose {
        symbol: String,
        close_percentage: u32,
        reasoning: String,
    },
    Hold {
        symbol: Option<String>,
        reasoning: String,
    },
    Wait {
        symbol: Option<String>,
        reasoning: String,
    },
}

impl Decision {
    pub fn action(&self) -> ActionKind {
        match self {
            Decision::Open(order) => match order.side {
                PositionSide::Long => ActionKind::OpenLong,
                PositionSide::Short => ActionKind::OpenShort,
            },
            Decision::Close { side, .. } => match side {
                PositionSide::Long => ActionKind::CloseLong,
                PositionSide::Short => ActionKind::CloseShort,
            },
            Decision::UpdateStop { .. } => ActionKind::UpdateStop,
            Decision::PartialClose { .. } => ActionKind::PartialClose,
            Decision::Hold { .. } => ActionKind::Hold,
            Decision::Wait { .. } => ActionKind::Wait,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            Decision::Open(order) => Some(&order.symbol),
            Decision::Close { symbol, .. }
            | Decision::UpdateStop { symbol, .. }
            | Decision::PartialClose { symbol, .. } => Some(symbol),
            Decision::Hold { symbol, .. } | Decision::Wait { symbol, .. } => symbol.as_deref(),
        }
    }
}

impl From<Decision> for RawDecision {
    fn from(decision: Decision) -> Self {
        let action = decision.action().as_str().to_string();
        match decision {
            Decision::Open(order) => RawDecision {
                symbol: Some(order.symbol),
                action,
                reasoning: order.reasoning,
                leverage: Some(i64::from(order.leverage)),
                position_size_usd: Some(order.position_size_usd),
                stop_loss: Some(order.stop_loss),
                take_profit_levels: order.take_profit_levels.to_vec(),
                trailing_stop_pct: order.trailing_stop_pct,
                checklist_passed: order.checklist_passed,
                risk_reward_ratio: order.risk_reward_ratio,
                signal_type: order.signal_type,
                oi_signal: order.oi_signal,
                oi_adjustment: order.oi_adjustment,
                ..RawDecision::default()
            },
            Decision::Close {
                symbol, reasoning, ..
            } => RawDecision {
                symbol: Some(symbol),
                action,
                reasoning,
                ..RawDecision::default()
            },
            Decision::UpdateStop {
                symbol,
                new_stop_loss,
                reasoning,
            } => RawDecision {
                symbol: Some(symbol),
                action,
                reasoning,
                new_stop_loss: Some(new_stop_loss),
                ..RawDecision::default()
            },
            Decision::PartialClose {
                symbol,
                close_percentage,
                reasoning,
            } => RawDecision {
                symbol: Some(symbol),
                action,
                reasoning,
                close_percentage: Some(i64::from(close_percentage)),
                ..RawDecision::default()
            },
            Decision::Hold { symbol, reasoning } | Decision::Wait { symbol, reasoning } => {
                RawDecision {
                    symbol,
                    action,
                    reasoning,
                    ..RawDecision::default()
                }
            }
        }
    }
}

/// All-or-nothing result of one evaluation cycle
#[derive(Debug, Clone, Serialize)]
pub struct DecisionBatch {
    /// Free text preceding the decision array
    pub rationale: String,
    pub decisions: Vec<Decision>,
    pub decided_at: DateTime<Utc>,
}

impl DecisionBatch {
    pub fn new(rationale: impl Into<String>, decisions: Vec<Decision>) -> Self {
        Self {
            rationale: rationale.into(),
            decisions,
            decided_at: Utc::now(),
        }
    }

    /// A batch with no instructions; what a failed cycle amounts to
    pub fn wait(rationale: impl Into<String>) -> Self {
        Self::new(rationale, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Decisions that open new positions
    pub fn opens(&self) -> impl Iterator<Item = &OpenOrder> {
        self.decisions.iter().filter_map(|d| match d {
            Decision::Open(order) => Some(order),
            _ => None,
        })
    }
}
