//! Error types for the application

use thiserror::Error;

use crate::decision::scanner::ExtractionFailure;
use crate::decision::validator::ValidationError;

/// Result type alias using our ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error type for external collaborator and configuration operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Symbol unknown to the data feed
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Configuration(format!("invalid URL: {}", err))
    }
}

/// Fatal failure of one evaluation cycle's decision batch.
///
/// Every variant keeps the rationale text that preceded the structured
/// payload, so an operator can see what the model was thinking even when
/// its structured output was unusable.
#[derive(Error, Debug)]
pub enum DecisionError {
    /// No decision array could be located in the response
    #[error("failed to extract decision array: {reason}")]
    Extraction {
        reason: ExtractionFailure,
        rationale: String,
    },

    /// The extracted array is not valid JSON for the decision schema
    #[error("failed to decode decision array: {source}; payload: {payload}")]
    Decode {
        source: serde_json::Error,
        payload: String,
        rationale: String,
    },

    /// A decoded record broke one of the decision invariants
    #[error("decision #{ordinal} failed validation: {source}")]
    Validation {
        /// 1-based position of the offending record
        ordinal: usize,
        source: ValidationError,
        rationale: String,
    },
}

impl DecisionError {
    /// Rationale text extracted from the response that failed
    pub fn rationale(&self) -> &str {
        match self {
            DecisionError::Extraction { rationale, .. }
            | DecisionError::Decode { rationale, .. }
            | DecisionError::Validation { rationale, .. } => rationale,
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            DecisionError::Extraction { .. } => "extraction",
            DecisionError::Decode { .. } => "decode",
            DecisionError::Validation { .. } => "validation",
        }
    }
}
