//! Positions, spans and insertion-point arithmetic.
//!
//! All positions are 0-based: `line` is a row, `column` a byte offset into
//! that row, matching tree-sitter's `Point`.

use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Point};

/// A line/column location in source text
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Start of the line below this one
    #[must_use]
    pub const fn next_line(self) -> Self {
        Self {
            line: self.line + 1,
            column: 0,
        }
    }
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self {
            line: point.row,
            column: point.column,
        }
    }
}

/// Start and end of a syntax node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn of(node: Node<'_>) -> Self {
        Self {
            start: node.start_position().into(),
            end: node.end_position().into(),
        }
    }
}

/// Inclusive containment test
pub fn contains_position(span: &SourceSpan, position: Position) -> bool {
    span.start <= position && position <= span.end
}

/// Where a log statement belongs inside a scope body.
///
/// Before the first top-level `return`; otherwise on the line after the last
/// statement; otherwise (empty or expression body) at `scope_end`.
pub fn compute_insert_position(statements: &[Node<'_>], scope_end: Position) -> Position {
    if let Some(ret) = statements
        .iter()
        .find(|stmt| stmt.kind() == "return_statement")
    {
        return ret.start_position().into();
    }

    match statements.last() {
        Some(last) => Position::from(last.end_position()).next_line(),
        None => scope_end,
    }
}

/// Line/column to byte offset conversion over a source text
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(idx, _)| idx + 1),
        );
        Self { text, line_starts }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of a position; columns past the end of a line clamp to it
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        let start = *self.line_starts.get(position.line)?;
        let line_len = self.line(position.line).map_or(0, str::len);
        Some(start + position.column.min(line_len))
    }

    /// Position of a byte offset; offsets past the end clamp to the end
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position::new(line, offset - self.line_starts[line])
    }

    /// Raw substring between two byte offsets
    pub fn slice(&self, start: usize, end: usize) -> Option<&'a str> {
        if start > end {
            return None;
        }
        self.text.get(start..end)
    }

    /// Text of a line without its terminator
    pub fn line(&self, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(self.text.len(), |next| next - 1);
        let raw = self.text.get(start..end)?;
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }

    /// Leading whitespace of a line
    pub fn indentation(&self, line: usize) -> &'a str {
        self.line(line).map_or("", |text| {
            let trimmed = text.trim_start_matches([' ', '\t']);
            &text[..text.len() - trimmed.len()]
        })
    }
}
