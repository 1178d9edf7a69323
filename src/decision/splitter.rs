//! Separates the rationale text from the structured payload

use super::scanner::ARRAY_START;

/// Text preceding the first `[`, trimmed.
///
/// Without any `[` the whole response is rationale.
pub fn split_rationale(response: &str) -> &str {
    match response.find(ARRAY_START as char) {
        Some(start) => response[..start].trim(),
        None => response.trim(),
    }
}
