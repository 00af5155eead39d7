use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A position in source code, tracking line, column, and byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line number
    line: usize,
    /// 1-based column number
    column: usize,
    /// 0-based byte offset from start of file
    offset: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Get the line number (1-based)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Get the column number (1-based)
    pub fn column(&self) -> usize {
        self.column
    }

    /// Get the byte offset (0-based)
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Create a position from a byte offset in source text
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        let mut current_offset = 0;

        for ch in source.chars() {
            if current_offset >= offset {
                break;
            }

            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }

            current_offset += ch.len_utf8();
        }

        Self {
            line,
            column,
            offset,
        }
    }

    /// Create a position at the start of a file
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }

    /// Advance position by one character
    pub fn advance(mut self, ch: char) -> Self {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.offset += ch.len_utf8();
        self
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_basic() {
        let pos = Position::new(10, 5, 245);
        assert_eq!(pos.line(), 10);
        assert_eq!(pos.column(), 5);
        assert_eq!(pos.offset(), 245);
    }

    #[test]
    fn test_position_from_offset() {
        let source = "line1\nline2\nline3";

        let pos0 = Position::from_offset(source, 0);
        assert_eq!(pos0.line(), 1);
        assert_eq!(pos0.column(), 1);

        let pos6 = Position::from_offset(source, 6);
        assert_eq!(pos6.line(), 2);
        assert_eq!(pos6.column(), 1);

        let pos8 = Position::from_offset(source, 8);
        assert_eq!(pos8.line(), 2);
        assert_eq!(pos8.column(), 3);
    }

    #[test]
    fn test_position_advance() {
        let pos = Position::start().advance('a').advance('\n').advance('b');
        assert_eq!(pos.line(), 2);
        assert_eq!(pos.column(), 2);
        assert_eq!(pos.offset(), 3);
    }

    #[test]
    fn test_position_ordering() {
        let a = Position::new(1, 9, 8);
        let b = Position::new(2, 1, 10);
        assert!(a < b);
        assert_eq!(b.to_string(), "2:1");
    }
}
