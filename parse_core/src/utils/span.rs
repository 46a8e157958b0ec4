//! Source location tracking
//!
//! A [`Location`] is a half-open range between two [`Position`]s. Tokens get
//! one from the scanner, and every grammar reduction builds the location of
//! the new node by merging the locations of what it consumed. Diagnostics
//! and AST consumers only ever see these merged ranges.

use crate::config::compile_time::lexical::TAB_WIDTH;
use serde::{Deserialize, Serialize};
use std::fmt;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// A line/column position. Both fields are 1-based.
///
/// Ordering is lexicographic: line first, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Line 1, column 1
    pub const fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Position after `ch`. A tab advances to the next multiple of
    /// `tab_width` (plus one); line breaks are handled by [`Position::newline`].
    pub fn advance(self, ch: char, tab_width: u32) -> Self {
        match ch {
            '\n' => self.newline(),
            '\t' => Self {
                line: self.line,
                column: self.column + tab_width - ((self.column - 1) % tab_width),
            },
            _ => Self {
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    pub fn newline(self) -> Self {
        Self {
            line: self.line + 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open source range `[start, end)`; `start == end` is a zero-width point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "location start {} after end {}", start, end);
        Self { start, end }
    }

    /// Zero-width location at `line:column`
    pub const fn point(line: u32, column: u32) -> Self {
        let at = Position::new(line, column);
        Self { start: at, end: at }
    }

    pub const fn at(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Smallest location covering both. Commutative and idempotent; the
    /// two inputs need not be adjacent.
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Merge of every location in `locations`, or `None` when empty
    pub fn merge_all<I>(locations: I) -> Option<Self>
    where
        I: IntoIterator<Item = Location>,
    {
        locations.into_iter().reduce(Self::merge)
    }

    /// Zero-width location right after `previous`. Empty reductions get this
    /// location so that they sit between their neighbours.
    pub fn empty_after(previous: Location) -> Self {
        Self::at(previous.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_multiline(&self) -> bool {
        self.start.line != self.end.line
    }

    /// True when `other` lies entirely within `self`
    pub fn encloses(&self, other: &Location) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when `position` is inside the half-open range
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Smallest location covering both `a` and `b`
pub fn merge(a: Location, b: Location) -> Location {
    a.merge(b)
}

/// Zero-width location at `line:column`
pub fn point(line: u32, column: u32) -> Location {
    Location::point(line, column)
}

/// A value with its source location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub location: Location,
}

impl<T> Spanned<T> {
    pub fn new(value: T, location: Location) -> Self {
        Self { value, location }
    }

    /// Map the value while preserving the location
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            value: f(self.value),
            location: self.location,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Line table over a source text, for turning locations back into text
#[derive(Debug, Clone)]
pub struct SourceMap {
    source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Build the line table. A leading byte-order mark is dropped, as the
    /// scanner drops it, so line 1 columns agree with token locations.
    pub fn new(source: impl Into<String>) -> Self {
        let mut source = source.into();
        if source.starts_with(BYTE_ORDER_MARK) {
            source.replace_range(..BYTE_ORDER_MARK.len_utf8(), "");
        }
        let mut line_starts = vec![0];
        let mut chars = source.char_indices().peekable();
        while let Some((offset, ch)) = chars.next() {
            match ch {
                '\n' => line_starts.push(offset + 1),
                '\r' => {
                    if let Some(&(next, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(next + 1);
                    } else {
                        line_starts.push(offset + 1);
                    }
                }
                _ => {}
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a 1-based line without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let idx = (line_num as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .copied()
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches(|c: char| c == '\n' || c == '\r'))
    }

    /// Byte offset of a position, walking the line with the scanner's
    /// column rules. `None` if the position is not on a character boundary
    /// of the text.
    pub fn offset_of(&self, position: Position) -> Option<usize> {
        let line_start = *self.line_starts.get((position.line as usize).checked_sub(1)?)?;
        let line = self.get_line(position.line)?;
        let mut current = Position::new(position.line, 1);
        for (offset, ch) in line.char_indices() {
            if current == position {
                return Some(line_start + offset);
            }
            if current > position {
                return None;
            }
            current = current.advance(ch, TAB_WIDTH);
        }
        // One past the last character on the line is valid
        (current == position).then_some(line_start + line.len())
    }

    /// Text covered by a location
    pub fn location_text(&self, location: &Location) -> Option<&str> {
        let start = self.offset_of(location.start)?;
        let end = self.offset_of(location.end)?;
        self.source.get(start..end)
    }

    /// Cargo-style report with the first line of the location underlined
    pub fn format_error(&self, location: &Location, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("error: {}\n", message));
        result.push_str(&format!("  --> {}\n", location.start));

        if let Some(line) = self.get_line(location.start.line) {
            let line = expand_tabs(line, TAB_WIDTH);
            let line_num_str = location.start.line.to_string();
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("{} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let start_col = location.start.column as usize;
            let caret_len = if location.is_multiline() {
                line.chars().count().saturating_sub(start_col - 1)
            } else {
                (location.end.column - location.start.column) as usize
            };

            result.push_str(&format!(
                "{} | {}{}\n",
                padding,
                " ".repeat(start_col - 1),
                "^".repeat(caret_len.max(1))
            ));
        }

        result
    }
}

fn expand_tabs(line: &str, tab_width: u32) -> String {
    let mut expanded = String::with_capacity(line.len());
    let mut position = Position::start();
    for ch in line.chars() {
        let next = position.advance(ch, tab_width);
        if ch == '\t' {
            expanded.extend(std::iter::repeat(' ').take((next.column - position.column) as usize));
        } else {
            expanded.push(ch);
        }
        position = next;
    }
    expanded
}
