//! Decision invariants
//!
//! Each raw record is checked in a fixed order and converted into a typed
//! [`Decision`]. The first violated rule rejects the record, and the first
//! rejected record rejects the whole batch.
//!
//! Order for opening records:
//!
//! 1. action is recognized, symbol present
//! 2. `0 < leverage <= ceiling` for the symbol's asset class
//! 3. position size positive
//! 4. position size within the notional cap (plus tolerance)
//! 5. stop positive
//! 6. exactly three take-profit levels, all positive
//! 7. stop and targets strictly ordered away from the stop
//! 8. reward:risk from the assumed entry at least the minimum

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{ActionKind, Decision, OpenOrder, RawDecision};
use crate::common::types::{LeverageCeilings, PositionSide};
use crate::config::types::RiskConfig;

/// Leverage and notional limits depend on the asset class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Major,
    Other,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::Major => write!(f, "major pair"),
            AssetClass::Other => write!(f, "other asset"),
        }
    }
}

/// A single violated rule, with the values that broke it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid action: {0:?}")]
    UnknownAction(String),

    #[error("{action} requires a symbol")]
    MissingSymbol { action: ActionKind },

    #[error("leverage for {symbol} ({class}) must be between 1 and {max}, got {leverage}")]
    Leverage {
        symbol: String,
        class: AssetClass,
        leverage: i64,
        max: u32,
    },

    #[error("position size must be greater than 0, got {size}")]
    NonPositiveSize { size: Decimal },

    #[error(
        "position size for {symbol} ({class}) exceeds notional cap {cap} ({multiple}x equity), got {size}"
    )]
    NotionalCap {
        symbol: String,
        class: AssetClass,
        size: Decimal,
        cap: Decimal,
        multiple: Decimal,
    },

    #[error("stop loss must be greater than 0, got {stop}")]
    NonPositiveStop { stop: Decimal },

    #[error("exactly 3 take-profit levels required, got {count}")]
    TakeProfitCount { count: usize },

    #[error("take-profit level {level} must be greater than 0, got {price}")]
    NonPositiveTakeProfit { level: usize, price: Decimal },

    #[error(
        "stop/take-profit ordering violated: {side} stop {stop} must be {} first take-profit {first_target}",
        stop_relation(.side)
    )]
    StopBeyondTarget {
        side: PositionSide,
        stop: Decimal,
        first_target: Decimal,
    },

    #[error(
        "take-profit ordering violated: {side} targets must be strictly {} {}",
        target_direction(.side),
        format_levels(.levels)
    )]
    TargetsNotMonotonic {
        side: PositionSide,
        levels: [Decimal; 3],
    },

    #[error(
        "risk:reward {ratio:.2} below minimum {min} [risk {risk_pct:.2}%, reward {reward_pct:.2}%] [stop {stop}, first take-profit {first_target}]"
    )]
    RiskReward {
        ratio: Decimal,
        min: Decimal,
        risk_pct: Decimal,
        reward_pct: Decimal,
        stop: Decimal,
        first_target: Decimal,
    },

    #[error("new stop loss for {symbol} must be greater than 0, got {stop}")]
    NonPositiveNewStop { symbol: String, stop: Decimal },

    #[error("close percentage for {symbol} must be between 1 and 100, got {percentage}")]
    ClosePercentage { symbol: String, percentage: i64 },
}

fn stop_relation(side: &PositionSide) -> &'static str {
    match side {
        PositionSide::Long => "below",
        PositionSide::Short => "above",
    }
}

fn target_direction(side: &PositionSide) -> &'static str {
    match side {
        PositionSide::Long => "increasing",
        PositionSide::Short => "decreasing",
    }
}

fn format_levels(levels: &[Decimal; 3]) -> String {
    format!("[{}, {}, {}]", levels[0], levels[1], levels[2])
}

impl ValidationError {
    /// Stable name of the violated rule
    pub fn rule(&self) -> &'static str {
        match self {
            ValidationError::UnknownAction(_) => "action",
            ValidationError::MissingSymbol { .. } => "symbol",
            ValidationError::Leverage { .. } => "leverage",
            ValidationError::NonPositiveSize { .. } => "position_size",
            ValidationError::NotionalCap { .. } => "notional_cap",
            ValidationError::NonPositiveStop { .. } => "stop_loss",
            ValidationError::TakeProfitCount { .. }
            | ValidationError::NonPositiveTakeProfit { .. } => "take_profit",
            ValidationError::StopBeyondTarget { .. }
            | ValidationError::TargetsNotMonotonic { .. } => "ordering",
            ValidationError::RiskReward { .. } => "risk_reward",
            ValidationError::NonPositiveNewStop { .. } => "new_stop_loss",
            ValidationError::ClosePercentage { .. } => "close_percentage",
        }
    }
}

/// Everything the validator needs to know about the account and config
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    pub account_equity: Decimal,
    pub leverage: LeverageCeilings,
    pub major_symbols: Vec<String>,
    pub major_notional_multiple: Decimal,
    pub other_notional_multiple: Decimal,
    pub notional_tolerance: Decimal,
    pub assumed_entry_fraction: Decimal,
    pub min_risk_reward: Decimal,
}

impl ValidationLimits {
    pub fn new(account_equity: Decimal, leverage: LeverageCeilings, risk: &RiskConfig) -> Self {
        Self {
            account_equity,
            leverage,
            major_symbols: risk.major_symbols.clone(),
            major_notional_multiple: risk.major_notional_multiple,
            other_notional_multiple: risk.other_notional_multiple,
            notional_tolerance: risk.notional_tolerance,
            assumed_entry_fraction: risk.assumed_entry_fraction,
            min_risk_reward: risk.min_risk_reward,
        }
    }

    pub fn asset_class(&self, symbol: &str) -> AssetClass {
        if self.major_symbols.iter().any(|s| s == symbol) {
            AssetClass::Major
        } else {
            AssetClass::Other
        }
    }

    pub fn max_leverage(&self, class: AssetClass) -> u32 {
        match class {
            AssetClass::Major => self.leverage.major,
            AssetClass::Other => self.leverage.other,
        }
    }

    pub fn notional_multiple(&self, class: AssetClass) -> Decimal {
        match class {
            AssetClass::Major => self.major_notional_multiple,
            AssetClass::Other => self.other_notional_multiple,
        }
    }
}

/// Entry assumed `fraction` of the way from the stop toward the first target.
///
/// The same expression serves both sides: for a short the target sits below
/// the stop, so the step is negative.
pub fn assumed_entry(stop: Decimal, first_target: Decimal, fraction: Decimal) -> Decimal {
    stop + (first_target - stop) * fraction
}

/// Reward divided by risk for an entry, stop and target.
///
/// Zero when the risk is not positive.
pub fn risk_reward_ratio(
    side: PositionSide,
    entry: Decimal,
    stop: Decimal,
    target: Decimal,
) -> Decimal {
    let (risk, reward) = match side {
        PositionSide::Long => (entry - stop, target - entry),
        PositionSide::Short => (stop - entry, entry - target),
    };
    if risk <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    reward / risk
}

/// Validate a batch in order.
///
/// On failure returns the 1-based ordinal of the first rejected record.
pub fn validate_decisions(
    raws: &[RawDecision],
    limits: &ValidationLimits,
) -> Result<Vec<Decision>, (usize, ValidationError)> {
    raws.iter()
        .enumerate()
        .map(|(i, raw)| validate_decision(raw, limits).map_err(|e| (i + 1, e)))
        .collect()
}

/// Validate one record and convert it into a typed decision
pub fn validate_decision(
    raw: &RawDecision,
    limits: &ValidationLimits,
) -> Result<Decision, ValidationError> {
    let action: ActionKind = raw
        .action
        .parse()
        .map_err(ValidationError::UnknownAction)?;

    let required_symbol = || {
        raw.symbol()
            .map(str::to_string)
            .ok_or(ValidationError::MissingSymbol { action })
    };

    match action {
        ActionKind::OpenLong => validate_open(raw, PositionSide::Long, limits).map(Decision::Open),
        ActionKind::OpenShort => {
            validate_open(raw, PositionSide::Short, limits).map(Decision::Open)
        }
        ActionKind::CloseLong | ActionKind::CloseShort => Ok(Decision::Close {
            symbol: required_symbol()?,
            side: if action == ActionKind::CloseLong {
                PositionSide::Long
            } else {
                PositionSide::Short
            },
            reasoning: raw.reasoning.clone(),
        }),
        ActionKind::UpdateStop => {
            let symbol = required_symbol()?;
            let stop = raw.new_stop_loss.unwrap_or(Decimal::ZERO);
            if stop <= Decimal::ZERO {
                return Err(ValidationError::NonPositiveNewStop { symbol, stop });
            }
            Ok(Decision::UpdateStop {
                symbol,
                new_stop_loss: stop,
                reasoning: raw.reasoning.clone(),
            })
        }
        ActionKind::PartialClose => {
            let symbol = required_symbol()?;
            let percentage = raw.close_percentage.unwrap_or(0);
            if !(1..=100).contains(&percentage) {
                return Err(ValidationError::ClosePercentage { symbol, percentage });
            }
            Ok(Decision::PartialClose {
                symbol,
                close_percentage: percentage as u32,
                reasoning: raw.reasoning.clone(),
            })
        }
        ActionKind::Hold => Ok(Decision::Hold {
            symbol: raw.symbol().map(str::to_string),
            reasoning: raw.reasoning.clone(),
        }),
        ActionKind::Wait => Ok(Decision::Wait {
            symbol: raw.symbol().map(str::to_string),
            reasoning: raw.reasoning.clone(),
        }),
    }
}

fn validate_open(
    raw: &RawDecision,
    side: PositionSide,
    limits: &ValidationLimits,
) -> Result<OpenOrder, ValidationError> {
    let action = match side {
        PositionSide::Long => ActionKind::OpenLong,
        PositionSide::Short => ActionKind::OpenShort,
    };
    let symbol = raw
        .symbol()
        .map(str::to_string)
        .ok_or(ValidationError::MissingSymbol { action })?;
    let class = limits.asset_class(&symbol);

    let leverage = raw.leverage.unwrap_or(0);
    let max = limits.max_leverage(class);
    if leverage <= 0 || leverage > i64::from(max) {
        return Err(ValidationError::Leverage {
            symbol,
            class,
            leverage,
            max,
        });
    }

    let size = raw.position_size_usd.unwrap_or(Decimal::ZERO);
    if size <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveSize { size });
    }

    let multiple = limits.notional_multiple(class);
    let cap = limits.account_equity * multiple;
    if size > cap + cap * limits.notional_tolerance {
        return Err(ValidationError::NotionalCap {
            symbol,
            class,
            size,
            cap,
            multiple,
        });
    }

    let stop = raw.stop_loss.unwrap_or(Decimal::ZERO);
    if stop <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveStop { stop });
    }

    let levels: [Decimal; 3] = raw
        .take_profit_levels
        .as_slice()
        .try_into()
        .map_err(|_| ValidationError::TakeProfitCount {
            count: raw.take_profit_levels.len(),
        })?;
    if let Some((i, price)) = levels.iter().enumerate().find(|(_, p)| **p <= Decimal::ZERO) {
        return Err(ValidationError::NonPositiveTakeProfit {
            level: i + 1,
            price: *price,
        });
    }

    check_ordering(side, stop, &levels)?;

    let entry = assumed_entry(stop, levels[0], limits.assumed_entry_fraction);
    let ratio = risk_reward_ratio(side, entry, stop, levels[0]);
    if ratio < limits.min_risk_reward {
        let hundred = Decimal::ONE_HUNDRED;
        let (risk, reward) = match side {
            PositionSide::Long => (entry - stop, levels[0] - entry),
            PositionSide::Short => (stop - entry, entry - levels[0]),
        };
        let pct = |distance: Decimal| {
            if entry > Decimal::ZERO {
                distance / entry * hundred
            } else {
                Decimal::ZERO
            }
        };
        return Err(ValidationError::RiskReward {
            ratio,
            min: limits.min_risk_reward,
            risk_pct: pct(risk),
            reward_pct: pct(reward),
            stop,
            first_target: levels[0],
        });
    }

    Ok(OpenOrder {
        symbol,
        side,
        leverage: leverage as u32,
        position_size_usd: size,
        stop_loss: stop,
        take_profit_levels: levels,
        trailing_stop_pct: raw.trailing_stop_pct,
        checklist_passed: raw.checklist_passed,
        risk_reward_ratio: raw.risk_reward_ratio,
        signal_type: raw.signal_type.clone(),
        oi_signal: raw.oi_signal.clone(),
        oi_adjustment: raw.oi_adjustment.clone(),
        reasoning: raw.reasoning.clone(),
    })
}

fn check_ordering(
    side: PositionSide,
    stop: Decimal,
    levels: &[Decimal; 3],
) -> Result<(), ValidationError> {
    let (stop_ok, targets_ok) = match side {
        PositionSide::Long => (stop < levels[0], levels[0] < levels[1] && levels[1] < levels[2]),
        PositionSide::Short => (stop > levels[0], levels[0] > levels[1] && levels[1] > levels[2]),
    };
    if !stop_ok {
        return Err(ValidationError::StopBeyondTarget {
            side,
            stop,
            first_target: levels[0],
        });
    }
    if !targets_ok {
        return Err(ValidationError::TargetsNotMonotonic {
            side,
            levels: *levels,
        });
    }
    Ok(())
}
