//! Repairs typographic quotes substituted into model output

use std::borrow::Cow;

/// Exactly the substitutions known to appear in model output. Anything
/// else malformed is left for the decoder to reject.
const QUOTE_SUBSTITUTIONS: [(char, char); 4] = [
    ('\u{201C}', '"'),
    ('\u{201D}', '"'),
    ('\u{2018}', '\''),
    ('\u{2019}', '\''),
];

fn substitute(c: char) -> Option<char> {
    QUOTE_SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Replace smart quotes with their ASCII equivalents.
///
/// Borrows when nothing needs replacing, so normalizing twice is free.
pub fn normalize_quotes(payload: &str) -> Cow<'_, str> {
    if !payload.chars().any(|c| substitute(c).is_some()) {
        return Cow::Borrowed(payload);
    }
    Cow::Owned(
        payload
            .chars()
            .map(|c| substitute(c).unwrap_or(c))
            .collect(),
    )
}
