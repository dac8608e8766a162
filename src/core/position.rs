/*!
# Source position types (Position, Point, Range)

Location types shared by the parser, the diagnostics engine and the editor
integration. All coordinates are zero based and measured in characters.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a node: start line/column plus its length on that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
    pub length: usize,
}

impl Position {
    pub fn new(line: usize, character: usize, length: usize) -> Self {
        Self {
            line,
            character,
            length,
        }
    }

    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Column just past the last character covered by this position.
    pub fn end_character(&self) -> usize {
        self.character + self.length
    }

    /// Single-line range covered by this position.
    pub fn range(&self) -> Range {
        Range::new(
            Point::new(self.line, self.character),
            Point::new(self.line, self.end_character()),
        )
    }

    /// Whether `(line, character)` falls inside this position.
    ///
    /// Zero-length positions still match their own start column so that
    /// empty parameters can be found by lookup.
    pub fn contains(&self, line: usize, character: usize) -> bool {
        line == self.line
            && character >= self.character
            && (character < self.end_character() || character == self.character)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// A line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub line: usize,
    pub character: usize,
}

impl Point {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Half-open range between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Range on a single line from `start` to `end` column.
    pub fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self::new(Point::new(line, start), Point::new(line, end))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start.line + 1, self.start.character + 1)
    }
}
