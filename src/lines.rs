//! Byte offset → line number lookup for diagnostics and summaries.

use std::fmt;
use std::ops::Range;

/// Closed, 1-indexed line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinePair {
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for LinePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Start offset of every line in a file.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut starts = Vec::new();
        if !content.is_empty() {
            starts.push(0);
        }
        for (i, b) in content.bytes().enumerate() {
            // A trailing newline does not open another line
            if b == b'\n' && i + 1 < content.len() {
                starts.push(i + 1);
            }
        }
        LineIndex { starts }
    }

    /// Number of lines in the file.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// 1-indexed line holding byte `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset).max(1)
    }

    /// Convert a half-open byte span into the closed pair of lines it touches.
    pub fn lines(&self, span: &Range<usize>) -> LinePair {
        let start = self.line_of(span.start);
        let last = if span.end > span.start {
            span.end - 1
        } else {
            span.start
        };
        LinePair {
            start,
            end: self.line_of(last).max(start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_starts() {
        let idx = LineIndex::new("a\nbc\n\nd");
        assert_eq!(idx.len(), 4);
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(3), 2);
        assert_eq!(idx.line_of(5), 3);
        assert_eq!(idx.line_of(6), 4);
    }

    #[test]
    fn trailing_newline_is_not_a_line() {
        assert_eq!(LineIndex::new("a\n").len(), 1);
        assert_eq!(LineIndex::new("").len(), 0);
    }

    #[test]
    fn span_to_lines() {
        let text = "one\ntwo\nthree\n";
        let idx = LineIndex::new(text);
        assert_eq!(idx.lines(&(0..3)), LinePair { start: 1, end: 1 });
        // span ending on the newline stays on that line
        assert_eq!(idx.lines(&(4..8)), LinePair { start: 2, end: 2 });
        assert_eq!(idx.lines(&(1..10)), LinePair { start: 1, end: 3 });
    }

    #[test]
    fn mid_line_start() {
        let idx = LineIndex::new("x = 1;\n  y = 2;\n");
        assert_eq!(idx.lines(&(9..15)), LinePair { start: 2, end: 2 });
    }

    #[test]
    fn display_pair() {
        assert_eq!(LinePair { start: 3, end: 3 }.to_string(), "3");
        assert_eq!(LinePair { start: 3, end: 7 }.to_string(), "3-7");
    }
}
