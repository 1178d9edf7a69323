//! Bracket-balanced scanning for the decision array
//!
//! The payload is located by depth counting rather than by pairing the first
//! `[` with the last `]`, so arrays nested inside decision objects (take
//! profit levels, for instance) do not end the scan early.

use std::fmt;

pub const ARRAY_START: u8 = b'[';
pub const ARRAY_END: u8 = b']';

/// Why no decision array could be located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// The response has no `[` at all
    MissingArrayStart,
    /// Depth never returned to zero after the `[` at `start`
    UnterminatedArray { start: usize },
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionFailure::MissingArrayStart => write!(f, "no array start marker found"),
            ExtractionFailure::UnterminatedArray { start } => write!(
                f,
                "no closing array marker found for array starting at byte {}",
                start
            ),
        }
    }
}

/// Forward scanner tracking bracket depth
///
/// Both markers are ASCII, so walking bytes never splits a UTF-8 sequence
/// at a position we report.
#[derive(Debug, Clone)]
pub struct BracketScanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> BracketScanner<'a> {
    /// Start scanning `text` at byte offset `start`
    pub fn new(text: &'a str, start: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: start,
            depth: 0,
        }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Advance until the bracket opened at the starting position closes.
    ///
    /// Returns the byte index of the matching `]`, or `None` when the
    /// starting byte is not `[` or the input ends first.
    pub fn find_close(&mut self) -> Option<usize> {
        if self.bytes.get(self.pos) != Some(&ARRAY_START) {
            return None;
        }

        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                ARRAY_START => self.depth += 1,
                ARRAY_END => {
                    // Stray closers before our opener cannot occur: we start on `[`.
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Some(self.pos);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }

        None
    }
}

/// Index of the `]` matching the `[` at `start`
pub fn find_matching_bracket(text: &str, start: usize) -> Option<usize> {
    BracketScanner::new(text, start).find_close()
}

/// Locate the first top-level array and return it as a slice.
pub fn extract_array(text: &str) -> Result<&str, ExtractionFailure> {
    let start = text
        .find(ARRAY_START as char)
        .ok_or(ExtractionFailure::MissingArrayStart)?;
    let end = find_matching_bracket(text, start)
        .ok_or(ExtractionFailure::UnterminatedArray { start })?;
    Ok(&text[start..=end])
}
