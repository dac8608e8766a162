/*!
# Segmenter

Splits MCS source into statement spans, comment spans and inline data
regions using only line-start markers, comment state and parenthesis depth.

* A line whose trimmed text starts with `++` begins a statement, unless a
  comment is still open at that point.
* A statement ends at the first `.` found at parenthesis depth zero, or at
  the next statement marker / end of input when there is none.
* Comments are removed from the statement text and replaced by a blank.
*/

use crate::core::Position;

pub const STATEMENT_MARKER: &str = "++";

/// One statement character together with its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceChar {
    pub ch: char,
    pub line: usize,
    pub column: usize,
}

/// Text of one statement with comments stripped and line breaks blanked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementSpan {
    pub index: usize,
    pub start_line: usize,
    pub start_column: usize,
    /// Characters up to, but not including, the terminator.
    pub chars: Vec<SourceChar>,
    /// Line and column of the terminating `.`.
    pub terminator: Option<(usize, usize)>,
    pub unbalanced_parens: i32,
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSpan {
    /// Start line, column and length on the start line.
    pub position: Position,
    pub end_line: usize,
    /// Begins outside of any statement.
    pub standalone: bool,
    /// Index of the statement the comment belongs to.
    pub owner: Option<usize>,
}

/// Lines consumed after a statement as opaque data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineData {
    pub first_line: usize,
    pub last_line: usize,
    /// At least one line holds something other than blanks and comments.
    pub has_content: bool,
}

fn starts_with_at(text: &[char], column: usize, pattern: [char; 2]) -> bool {
    text.get(column) == Some(&pattern[0]) && text.get(column + 1) == Some(&pattern[1])
}

/// Column of the statement marker when the line starts a statement.
pub fn marker_column(text: &[char]) -> Option<usize> {
    let column = text.iter().position(|c| !c.is_whitespace())?;
    starts_with_at(text, column, ['+', '+']).then_some(column)
}

/// Records comment spans and remembers whether one is still open.
#[derive(Debug, Default)]
struct CommentTracker {
    comments: Vec<CommentSpan>,
    open: Option<usize>,
}

impl CommentTracker {
    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn open(&mut self, line: usize, column: usize, width: usize, standalone: bool, owner: Option<usize>) {
        self.open = Some(self.comments.len());
        self.comments.push(CommentSpan {
            position: Position::new(line, column, width.saturating_sub(column)),
            end_line: line,
            standalone,
            owner,
        });
    }

    /// Closes the open comment whose `*/` starts at `column`.
    fn close(&mut self, line: usize, column: usize) {
        if let Some(index) = self.open.take() {
            let comment = &mut self.comments[index];
            comment.end_line = line;
            if comment.position.line == line {
                comment.position.length = column + 2 - comment.position.character;
            }
        }
    }

    /// Ends the open comment at `line` without a closing delimiter.
    fn abandon(&mut self, line: usize) {
        if let Some(index) = self.open.take() {
            self.comments[index].end_line = line;
        }
    }

    /// Records comments in `text[from..]`, ignoring everything else.
    fn skim(&mut self, text: &[char], line: usize, from: usize, standalone: bool, owner: Option<usize>) {
        let mut column = from;
        while column < text.len() {
            if self.is_open() {
                if starts_with_at(text, column, ['*', '/']) {
                    self.close(line, column);
                    column += 2;
                } else {
                    column += 1;
                }
            } else if starts_with_at(text, column, ['/', '*']) {
                self.open(line, column, text.len(), standalone, owner);
                column += 2;
            } else {
                column += 1;
            }
        }
        if let Some(index) = self.open {
            self.comments[index].end_line = line;
        }
    }
}

/// Incremental splitter over the lines of one document.
///
/// The caller decides after each statement whether inline data follows,
/// since that depends on the statement's schema and operands.
#[derive(Debug)]
pub struct Segmenter {
    lines: Vec<Vec<char>>,
    line: usize,
    statements: usize,
    tracker: CommentTracker,
}

impl Segmenter {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(|line| line.chars().collect()).collect(),
            line: 0,
            statements: 0,
            tracker: CommentTracker::default(),
        }
    }

    /// Width of every line without trailing blanks.
    pub fn line_widths(&self) -> Vec<usize> {
        self.lines
            .iter()
            .map(|line| {
                line.iter()
                    .rposition(|c| !c.is_whitespace())
                    .map_or(0, |last| last + 1)
            })
            .collect()
    }

    /// Reads up to and including the next statement.
    pub fn next_statement(&mut self) -> Option<StatementSpan> {
        while self.line < self.lines.len() {
            if !self.tracker.is_open() {
                if let Some(column) = marker_column(&self.lines[self.line]) {
                    return Some(self.read_statement(column));
                }
            }
            self.tracker.skim(&self.lines[self.line], self.line, 0, true, None);
            self.line += 1;
        }
        None
    }

    fn read_statement(&mut self, start_column: usize) -> StatementSpan {
        let index = self.statements;
        self.statements += 1;

        let start_line = self.line;
        let mut chars = Vec::new();
        let mut depth: i32 = 0;
        let mut min_depth: i32 = 0;
        let mut terminator = None;
        let mut line = start_line;
        let mut column = start_column;

        let end_line = loop {
            let text = &self.lines[line];
            while column < text.len() {
                if self.tracker.is_open() {
                    if starts_with_at(text, column, ['*', '/']) {
                        self.tracker.close(line, column);
                        column += 2;
                    } else {
                        column += 1;
                    }
                    continue;
                }
                if starts_with_at(text, column, ['/', '*']) {
                    self.tracker.open(line, column, text.len(), false, Some(index));
                    chars.push(SourceChar { ch: ' ', line, column });
                    column += 2;
                    continue;
                }

                let ch = text[column];
                match ch {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        min_depth = min_depth.min(depth);
                    }
                    '.' if depth == 0 => {
                        terminator = Some((line, column));
                        break;
                    }
                    _ => {}
                }
                chars.push(SourceChar { ch, line, column });
                column += 1;
            }

            if let Some((_, at)) = terminator {
                self.tracker.skim(text, line, at + 1, false, Some(index));
                self.line = line + 1;
                break line;
            }
            if let Some(open) = self.tracker.open {
                self.tracker.comments[open].end_line = line;
            }

            chars.push(SourceChar { ch: ' ', line, column: text.len() });
            line += 1;
            column = 0;
            let at_marker = line < self.lines.len()
                && !self.tracker.is_open()
                && marker_column(&self.lines[line]).is_some();
            if line >= self.lines.len() || at_marker {
                self.line = line;
                break line - 1;
            }
        };

        let unbalanced_parens = if min_depth < 0 { min_depth } else { depth };
        StatementSpan {
            index,
            start_line,
            start_column,
            chars,
            terminator,
            unbalanced_parens,
            end_line,
        }
    }

    /// Consumes lines up to the next statement marker as inline data.
    ///
    /// A marker ends the data even when a comment inside it is still open.
    pub fn take_inline_data(&mut self) -> Option<InlineData> {
        let first_line = self.line;
        let mut has_content = false;
        let mut in_comment = false;

        while self.line < self.lines.len() {
            let text = &self.lines[self.line];
            if marker_column(text).is_some() {
                break;
            }

            let mut column = 0;
            while column < text.len() {
                if self.tracker.is_open() {
                    // comment started on the terminator line
                    if starts_with_at(text, column, ['*', '/']) {
                        self.tracker.close(self.line, column);
                        column += 2;
                    } else {
                        column += 1;
                    }
                } else if in_comment {
                    if starts_with_at(text, column, ['*', '/']) {
                        in_comment = false;
                        column += 2;
                    } else {
                        column += 1;
                    }
                } else if starts_with_at(text, column, ['/', '*']) {
                    in_comment = true;
                    column += 2;
                } else {
                    has_content |= !text[column].is_whitespace();
                    column += 1;
                }
            }
            if let Some(open) = self.tracker.open {
                self.tracker.comments[open].end_line = self.line;
            }
            self.line += 1;
        }

        if self.tracker.is_open() {
            self.tracker.abandon(self.line.saturating_sub(1));
        }

        (self.line > first_line).then_some(InlineData {
            first_line,
            last_line: self.line - 1,
            has_content,
        })
    }

    /// Consumes the rest of the input and returns every comment found.
    pub fn finish(mut self) -> Vec<CommentSpan> {
        while self.next_statement().is_some() {}
        self.tracker.comments
    }
}
