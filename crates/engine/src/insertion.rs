use crate::error::{EngineError, Result};
use crate::position::{LineIndex, Position};
use crate::render::DEV_CHECK_OPEN;
use serde::{Deserialize, Serialize};

/// Lines above and below an insertion point searched for an identical statement
pub const DUPLICATE_WINDOW: usize = 2;

/// A statement to place at a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insertion {
    pub position: Position,
    pub text: String,
}

impl Insertion {
    pub fn new(position: Position, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// Apply insertions to `source`, each as its own line(s).
///
/// - column 0: placed at the start of the line, indented like the line above
/// - a column preceded only by whitespace: placed on its own line at that indentation
/// - any other column: inserted verbatim at the position, followed by a newline
///
/// Positions one line past the end append to the text. Insertions sharing a
/// position keep their relative order.
pub fn apply_insertions(source: &str, insertions: &[Insertion]) -> Result<String> {
    let index = LineIndex::new(source);
    let mut planned = Vec::with_capacity(insertions.len());

    for (order, insertion) in insertions.iter().enumerate() {
        let (offset, text) = plan(&index, insertion)?;
        planned.push((offset, order, text));
    }

    planned.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let mut out = source.to_string();
    for (offset, _, text) in planned {
        out.insert_str(offset, &text);
    }
    Ok(out)
}

fn plan(index: &LineIndex<'_>, insertion: &Insertion) -> Result<(usize, String)> {
    let Position { line, column } = insertion.position;
    let invalid = || EngineError::InvalidPosition { line, column };

    if line == index.line_count() && column == 0 {
        let source = index.text();
        let indent = line.checked_sub(1).map_or("", |above| index.indentation(above));
        let lead = if source.is_empty() || source.ends_with('\n') {
            ""
        } else {
            "\n"
        };
        let text = format!("{lead}{}", indent_lines(&insertion.text, indent));
        return Ok((source.len(), text));
    }

    let line_text = index.line(line).ok_or_else(invalid)?;
    let line_start = index
        .offset_at(Position::new(line, 0))
        .ok_or_else(invalid)?;

    if column == 0 {
        let indent = line.checked_sub(1).map_or("", |above| index.indentation(above));
        return Ok((line_start, indent_lines(&insertion.text, indent)));
    }

    let before = line_text.get(..column).ok_or_else(invalid)?;
    if before.trim().is_empty() {
        return Ok((line_start, indent_lines(&insertion.text, before)));
    }

    let offset = index.offset_at(insertion.position).ok_or_else(invalid)?;
    Ok((offset, format!("{}\n", insertion.text)))
}

/// True when `statement` already sits within [`DUPLICATE_WINDOW`] lines of `position`.
///
/// Lines compare with surrounding whitespace trimmed; a multi-line statement
/// must appear as a consecutive run overlapping the window.
pub fn is_duplicate_nearby(source: &str, position: Position, statement: &str) -> bool {
    let wanted: Vec<&str> = statement
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if wanted.is_empty() {
        return false;
    }

    let lines: Vec<&str> = source.lines().map(str::trim).collect();
    let first = position
        .line
        .saturating_sub(DUPLICATE_WINDOW + wanted.len() - 1);
    let last = position.line + DUPLICATE_WINDOW;
    (first..=last).any(|start| {
        lines
            .get(start..start + wanted.len())
            .is_some_and(|run| run == wanted.as_slice())
    })
}

/// Source with tagged statements removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleaned {
    pub text: String,
    /// 0-based lines dropped from the original text
    pub removed: Vec<usize>,
}

/// Remove every line containing `tag`.
///
/// A tagged `}` closing a `NODE_ENV` guard takes the guard with it, and a
/// `debugger;` line directly above a removed statement goes too. An empty
/// tag removes nothing.
pub fn strip_tagged_lines(source: &str, tag: &str) -> Cleaned {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let mut drop = vec![false; lines.len()];

    if !tag.is_empty() {
        for (index, line) in lines.iter().enumerate() {
            if !line.contains(tag) {
                continue;
            }
            let mut first = index;
            if line.trim_start().starts_with('}')
                && index >= 2
                && lines[index - 2].trim() == DEV_CHECK_OPEN
            {
                first = index - 2;
            }
            if first >= 1 && lines[first - 1].trim() == "debugger;" {
                first -= 1;
            }
            drop[first..=index].fill(true);
        }
    }

    let mut text = String::with_capacity(source.len());
    let mut removed = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if drop[index] {
            removed.push(index);
        } else {
            text.push_str(line);
        }
    }
    Cleaned { text, removed }
}

fn indent_lines(text: &str, indent: &str) -> String {
    let mut out = String::with_capacity(text.len() + indent.len() + 1);
    for line in text.lines() {
        if !line.is_empty() {
            out.push_str(indent);
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
