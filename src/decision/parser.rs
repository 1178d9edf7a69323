//! End-to-end handling of one model response

use tracing::{debug, error, info, instrument};

use super::decoder::decode_decisions;
use super::normalizer::normalize_quotes;
use super::scanner::extract_array;
use super::splitter::split_rationale;
use super::types::DecisionBatch;
use super::validator::{validate_decisions, ValidationLimits};
use crate::common::errors::DecisionError;

/// Split, extract, normalize, decode and validate a response.
///
/// Any failure rejects the whole batch; the error carries the rationale.
#[instrument(skip_all, fields(response_len = response.len()))]
pub fn parse_response(
    response: &str,
    limits: &ValidationLimits,
) -> Result<DecisionBatch, DecisionError> {
    let rationale = split_rationale(response).to_string();

    let payload = match extract_array(response) {
        Ok(payload) => payload,
        Err(reason) => return Err(DecisionError::Extraction { reason, rationale }),
    };

    let payload = normalize_quotes(payload);
    debug!(payload_len = payload.len(), "extracted decision payload");

    let raws = match decode_decisions(&payload) {
        Ok(raws) => raws,
        Err(source) => {
            return Err(DecisionError::Decode {
                source,
                payload: payload.into_owned(),
                rationale,
            })
        }
    };

    let decisions = match validate_decisions(&raws, limits) {
        Ok(decisions) => decisions,
        Err((ordinal, source)) => {
            return Err(DecisionError::Validation {
                ordinal,
                source,
                rationale,
            })
        }
    };

    info!(count = decisions.len(), "decision batch accepted");
    Ok(DecisionBatch::new(rationale, decisions))
}

/// Like [`parse_response`], but a failed cycle becomes an empty batch.
///
/// The failure and the model's rationale are logged for the operator.
pub fn parse_response_or_wait(response: &str, limits: &ValidationLimits) -> DecisionBatch {
    match parse_response(response, limits) {
        Ok(batch) => batch,
        Err(err) => {
            error!(
                kind = err.kind(),
                "decision batch rejected: {}\n\n=== rationale ===\n{}",
                err,
                err.rationale()
            );
            DecisionBatch::wait(err.rationale())
        }
    }
}
