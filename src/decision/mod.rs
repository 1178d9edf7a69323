//! Decision pipeline: from a free-text model response to a validated batch
//!
//! # Architecture
//!
//! ```text
//! response text
//!      │
//!      ├── splitter    → rationale (text before the first `[`)
//!      │
//!      ├── scanner     → first top-level array, by bracket depth
//!      │
//!      ├── normalizer  → smart quotes replaced with ASCII quotes
//!      │
//!      ├── decoder     → Vec<RawDecision> (flat wire records)
//!      │
//!      └── validator   → Vec<Decision> (typed, invariants checked)
//! ```
//!
//! The batch is all-or-nothing: one bad record rejects every record, and
//! every failure keeps the rationale for operator review.

pub mod decoder;
pub mod normalizer;
pub mod parser;
pub mod scanner;
pub mod splitter;
pub mod types;
pub mod validator;

pub use decoder::decode_decisions;
pub use normalizer::normalize_quotes;
pub use parser::{parse_response, parse_response_or_wait};
pub use scanner::{extract_array, find_matching_bracket, BracketScanner, ExtractionFailure};
pub use splitter::split_rationale;
pub use types::{ActionKind, Decision, DecisionBatch, OpenOrder, RawDecision};
pub use validator::{
    assumed_entry, risk_reward_ratio, validate_decision, validate_decisions, AssetClass,
    ValidationError, ValidationLimits,
};
