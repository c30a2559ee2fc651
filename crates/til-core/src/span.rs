//! Source positions attached to AST nodes and diagnostics.

use std::fmt;

/// Where a construct starts in the source program.
///
/// The parser records the line of every node; the column is optional and
/// left at zero when unknown.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, 0 when unknown).
    pub col: u32,
}

impl Span {
    /// Create a span at a line and column.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Create a span that only knows its line.
    #[inline]
    pub fn line(line: u32) -> Self {
        Self { line, col: 0 }
    }

    /// Whether the span carries a column.
    #[inline]
    pub fn has_col(&self) -> bool {
        self.col != 0
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_col() {
            write!(f, "{}:{}", self.line, self.col)
        } else {
            write!(f, "line {}", self.line)
        }
    }
}
