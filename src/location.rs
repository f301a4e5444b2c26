//! Source positions and locations
//!
//! Lines and columns are 1-based. A [`Location`] is a validated range inside
//! one file; its end column is exclusive (one past the last character).

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised when constructing positions or locations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("line number must be positive, got {0}")]
    InvalidLine(usize),

    #[error("column number must be positive, got {0}")]
    InvalidColumn(usize),

    #[error("start line ({start}) must not be after end line ({end})")]
    StartLineAfterEndLine { start: usize, end: usize },

    #[error("start column ({start}) must not be after end column ({end}) on line {line}")]
    StartColumnAfterEndColumn {
        line: usize,
        start: usize,
        end: usize,
    },
}

/// A 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineNumber(NonZeroUsize);

impl LineNumber {
    /// Create a line number, rejecting zero
    pub fn new(number: usize) -> Result<Self, LocationError> {
        NonZeroUsize::new(number)
            .map(Self)
            .ok_or(LocationError::InvalidLine(number))
    }

    fn from_zero_based(number: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(number))
    }

    /// The line number as a plain integer
    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// A 1-based column number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnNumber(NonZeroUsize);

impl ColumnNumber {
    /// Create a column number, rejecting zero
    pub fn new(number: usize) -> Result<Self, LocationError> {
        NonZeroUsize::new(number)
            .map(Self)
            .ok_or(LocationError::InvalidColumn(number))
    }

    fn from_zero_based(number: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(number))
    }

    /// The column number as a plain integer
    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// A line/column pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: LineNumber,
    pub column: ColumnNumber,
}

impl Position {
    /// Create a position from 1-based line and column numbers
    pub fn new(line: usize, column: usize) -> Result<Self, LocationError> {
        Ok(Self {
            line: LineNumber::new(line)?,
            column: ColumnNumber::new(column)?,
        })
    }

    /// Position of the first character of a file
    pub fn start_of_file() -> Self {
        Self {
            line: LineNumber::from_zero_based(0),
            column: ColumnNumber::from_zero_based(0),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line.get(), self.column.get())
    }
}

/// An ordered start/end pair, not yet tied to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    start: Position,
    end: Position,
}

impl Span {
    /// Create a span, checking that `start` does not come after `end`
    pub fn new(start: Position, end: Position) -> Result<Self, LocationError> {
        let (start_line, end_line) = (start.line.get(), end.line.get());
        if start_line > end_line {
            return Err(LocationError::StartLineAfterEndLine {
                start: start_line,
                end: end_line,
            });
        }
        if start_line == end_line && start.column > end.column {
            return Err(LocationError::StartColumnAfterEndColumn {
                line: start_line,
                start: start.column.get(),
                end: end.column.get(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }
}

/// Identifies the file a location points into
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileIdentifier(Arc<str>);

impl FileIdentifier {
    pub fn new(path: impl Into<String>) -> Self {
        Self(Arc::from(path.into()))
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated range inside a file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    file: FileIdentifier,
    span: Span,
}

impl Location {
    /// Create a location, failing when `start` comes after `end`
    pub fn new(file: FileIdentifier, start: Position, end: Position) -> Result<Self, LocationError> {
        Ok(Self {
            file,
            span: Span::new(start, end)?,
        })
    }

    /// Attach an already validated span to a file
    pub fn from_span(file: FileIdentifier, span: Span) -> Self {
        Self { file, span }
    }

    /// A location covering every character of `text`
    pub fn whole_file(file: FileIdentifier, text: &str) -> Self {
        let index = LineIndex::new(text);
        let span = Span {
            start: Position::start_of_file(),
            end: index.end_of_text(),
        };
        Self { file, span }
    }

    pub fn file(&self) -> &FileIdentifier {
        &self.file
    }

    pub fn start(&self) -> Position {
        self.span.start
    }

    pub fn end(&self) -> Position {
        self.span.end
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.file, self.span.start, self.span.end)
    }
}

/// Anything that can resolve where it lives in a source file
pub trait Locatable {
    fn location(&self) -> Location;
}

impl Locatable for Location {
    fn location(&self) -> Location {
        self.clone()
    }
}

/// Maps char offsets of a text to 1-based positions
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Char offset of the first character of every line
    line_starts: Vec<usize>,
    /// Total number of chars in the text
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut len = 0;
        for ch in text.chars() {
            len += 1;
            if ch == '\n' {
                line_starts.push(len);
            }
        }
        Self { line_starts, len }
    }

    /// Position of the char at `offset`; offsets past the end clamp to the end of text
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position {
            line: LineNumber::from_zero_based(line),
            column: ColumnNumber::from_zero_based(offset - self.line_starts[line]),
        }
    }

    /// One column past the last character of the last non-empty line
    pub fn end_of_text(&self) -> Position {
        let mut last = self.line_starts.len() - 1;
        // A trailing newline opens an empty line that holds no characters
        if last > 0 && self.line_starts[last] == self.len {
            last -= 1;
        }
        let line_len = self.line_end(last) - self.line_starts[last];
        Position {
            line: LineNumber::from_zero_based(last),
            column: ColumnNumber::from_zero_based(line_len),
        }
    }

    /// Char offset just past the last character of `line` (0-based), excluding the newline
    fn line_end(&self, line: usize) -> usize {
        match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column).unwrap()
    }

    fn file() -> FileIdentifier {
        FileIdentifier::new("test.yml")
    }

    #[test]
    fn test_zero_line_is_rejected() {
        assert_eq!(Position::new(0, 1), Err(LocationError::InvalidLine(0)));
        assert_eq!(Position::new(1, 0), Err(LocationError::InvalidColumn(0)));
    }

    #[test]
    fn test_start_line_after_end_line() {
        let err = Location::new(file(), pos(2, 1), pos(1, 1)).unwrap_err();
        assert_eq!(err, LocationError::StartLineAfterEndLine { start: 2, end: 1 });
        assert_eq!(
            err.to_string(),
            "start line (2) must not be after end line (1)"
        );
    }

    #[test]
    fn test_start_column_after_end_column_on_same_line() {
        let err = Location::new(file(), pos(3, 5), pos(3, 2)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "start column (5) must not be after end column (2) on line 3"
        );
    }

    #[test]
    fn test_columns_unconstrained_across_lines() {
        let location = Location::new(file(), pos(1, 10), pos(2, 1)).unwrap();
        assert_eq!(location.start(), pos(1, 10));
        assert_eq!(location.end(), pos(2, 1));
    }

    #[test]
    fn test_empty_location_is_valid() {
        assert!(Location::new(file(), pos(4, 4), pos(4, 4)).is_ok());
    }

    #[test]
    fn test_line_index_positions() {
        let index = LineIndex::new("ab\ncd\n\nx");
        assert_eq!(index.position(0), pos(1, 1));
        assert_eq!(index.position(2), pos(1, 3));
        assert_eq!(index.position(3), pos(2, 1));
        assert_eq!(index.position(6), pos(3, 1));
        assert_eq!(index.position(7), pos(4, 1));
        assert_eq!(index.position(100), pos(4, 2));
    }

    #[test]
    fn test_whole_file_location() {
        let location = Location::whole_file(file(), "x: *");
        assert_eq!(location.start(), pos(1, 1));
        assert_eq!(location.end(), pos(1, 5));

        let location = Location::whole_file(file(), "a: 1\nbcd: 2\n");
        assert_eq!(location.end(), pos(2, 7));

        let location = Location::whole_file(file(), "");
        assert_eq!(location.end(), pos(1, 1));
    }

    #[test]
    fn test_display() {
        let location = Location::new(file(), pos(1, 2), pos(3, 4)).unwrap();
        assert_eq!(location.to_string(), "test.yml:1:2-3:4");
    }
}
