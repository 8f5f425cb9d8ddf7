//! Position and range tracking for analyzed sources
//!
//! Every structured input produced by the scanners carries a [`Range`] of
//! line/column positions. Columns are byte offsets within their line, lines
//! are zero based. Recommendations reuse the same type for their edit ranges,
//! so a range computed here can be turned into a text edit without further
//! conversion.
//!
//! - [`Position`] - a line:column position
//! - [`Range`] - a start/end pair of positions, ordered by start then end
//! - [`SourceLocation`] - converts byte offsets of a text into positions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range as ByteRange;

/// A line:column position within a document
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Open end used by suppression ranges that run to the end of a document or line.
    pub const MAX: Position = Position {
        line: usize::MAX,
        column: usize::MAX,
    };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Same line, `columns` further to the right.
    pub fn shifted(self, columns: usize) -> Self {
        Self::new(self.line, self.column + columns)
    }

    /// Position reached after walking over `text` starting here.
    pub fn advance(self, text: &str) -> Self {
        match text.rfind('\n') {
            Some(last) => Position::new(
                self.line + text.matches('\n').count(),
                text.len() - last - 1,
            ),
            None => self.shifted(text.len()),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A region of a document, from `start` up to `end`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Shorthand for a range on a single line.
    pub fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self::new(Position::new(line, start), Position::new(line, end))
    }

    /// Full containment: `other` starts no earlier and ends no later than this range.
    pub fn encloses(&self, other: &Range) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Check if a position is contained within this range (both ends inclusive)
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.contains(other.start)
            || self.contains(other.end)
            || other.contains(self.start)
            || other.contains(self.end)
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Provides fast conversion from byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a line/column position
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);
        Position::new(line, byte_offset - self.line_starts[line])
    }

    pub fn byte_range(&self, range: &ByteRange<usize>) -> Range {
        Range::new(
            self.byte_to_position(range.start),
            self.byte_to_position(range.end),
        )
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }
}
