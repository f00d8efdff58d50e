//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where tokens, nodes and errors occur in source code.

use std::fmt;

/// A span of source code, represented by its starting position.
///
/// Lines and columns are 1-indexed; the diagnostics layer reports `line`
/// directly to the caller.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Merge two spans into one that starts at `self` and extends to cover `other`.
    ///
    /// Multi-line spans only keep the starting position; the length is approximate.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line == other.line {
            let start_col = self.col.min(other.col);
            let end_col = (other.col + other.len).max(self.col + self.len);
            Span {
                line: self.line,
                col: start_col,
                len: end_col - start_col,
            }
        } else {
            Span {
                line: self.line,
                col: self.col,
                len: self.len + other.len,
            }
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = Span::new(1, 5, 10);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert!(Span::point(1, 5).is_empty());
    }

    #[test]
    fn span_display() {
        assert_eq!(format!("{}", Span::new(3, 15, 5)), "3:15");
    }

    #[test]
    fn merge_same_line() {
        let merged = Span::new(1, 5, 3).merge(Span::new(1, 10, 3));
        assert_eq!(merged, Span::new(1, 5, 8));
    }

    #[test]
    fn merge_across_lines_keeps_start() {
        let merged = Span::new(2, 7, 4).merge(Span::new(4, 1, 2));
        assert_eq!(merged.line, 2);
        assert_eq!(merged.col, 7);
        assert_eq!(merged.len, 6);
    }
}
