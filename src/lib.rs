//! LLM Decision Core Library
//!
//! Turns a free-text model response into a validated batch of trading
//! decisions, and assembles the per-cycle market context the model is
//! prompted with.

pub mod common;
pub mod config;
pub mod context;
pub mod decision;
pub mod feed;

// Re-export commonly used types
pub use common::errors::{ClientError, DecisionError, Result};
pub use common::traits::{MarketDataProvider, OpenInterestRankingSource};
pub use common::types::{
    AccountSnapshot, CandidateEntry, CandidateSource, CycleInput, InstrumentSnapshot,
    LeverageCeilings, OiRanking, OpenInterest, PositionRecord, PositionSide,
};
pub use config::types::AppConfig;
pub use context::{AssemblerSettings, ContextAssembler, EvaluationContext};
pub use feed::FeedRestClient;

// Decision pipeline
pub use decision::{
    parse_response, parse_response_or_wait, ActionKind, Decision, DecisionBatch, OpenOrder,
    RawDecision, ValidationError, ValidationLimits,
};
