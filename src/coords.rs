//! Coordinate structures used to reference specific locations within parser input
#![allow(clippy::len_without_is_empty)]

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A [Coords] represents a single location within the parser input
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Coords {
    /// The absolute character position, counting from 1. Zero before any input has been read
    pub absolute: usize,
    /// The line position, starting at 1
    pub line: usize,
    /// The column position. Zero until the first character of a line has been read
    pub column: usize,
}

impl Coords {
    /// Advance the coordinates over a single character. A newline moves onto the next line and
    /// resets the column
    pub fn advance(&mut self, c: char) {
        self.absolute += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl Display for Coords {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[abs: {}, line: {}, column: {}]",
            self.absolute, self.line, self.column
        )
    }
}

impl Default for Coords {
    /// The default set of coordinates are positioned before the first character of the first line
    fn default() -> Self {
        Coords {
            absolute: 0,
            line: 1,
            column: 0,
        }
    }
}

impl PartialOrd<Self> for Coords {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coords {
    fn cmp(&self, other: &Self) -> Ordering {
        self.absolute.cmp(&other.absolute)
    }
}

/// A [Span] represents a linear interval within the parser input, between two different [Coords]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Span {
    /// Start [Coords] for the span
    pub start: Coords,
    /// End [Coords] for the span
    pub end: Coords,
}

impl Span {
    /// Get the length of the span, minimum is 1
    pub fn len(&self) -> usize {
        match self.start.cmp(&self.end) {
            Ordering::Less => self.end.absolute - self.start.absolute + 1,
            Ordering::Equal => 1,
            Ordering::Greater => self.start.absolute - self.end.absolute + 1,
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "start: {}, end: {}, length: {}",
            self.start,
            self.end,
            self.len()
        )
    }
}
