//! Decodes the normalized payload into raw decision records

use super::types::RawDecision;

/// Decode a JSON array of decision objects.
///
/// Unknown fields are ignored and missing ones default; only syntactically
/// broken JSON or wrongly typed values fail here.
pub fn decode_decisions(payload: &str) -> Result<Vec<RawDecision>, serde_json::Error> {
    serde_json::from_str(payload)
}
