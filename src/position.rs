use std::fmt;

use serde::{Deserialize, Serialize};

/// A location within the original input stream.
///
/// Buffers keep two of these: the start marker, pointing at the first
/// buffered item, and the end marker, pointing one past the last. Both
/// keep moving forward as content is shifted out, without discontinuities,
/// even when the bound input is replaced mid-stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based column within the line, counted in characters.
    pub col: usize,
    /// Absolute character offset from the beginning of the input stream.
    pub offset: usize,
}

impl Position {
    /// A position at the given coordinates.
    pub fn new(line: usize, col: usize, offset: usize) -> Self {
        Self { line, col, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
