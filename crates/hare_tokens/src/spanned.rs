//! A trait that can provide the [Span] of the complete context of a syntax node

use std::ops::Range;

/// A trait that can provide the [Span] of the complete context of a syntax node
///
/// This is automatically implemented for all types that implemented [ToTokens](crate::token::ToTokens)
/// and [Span] itself.
pub trait Spanned {
    fn span(&self) -> Span;
}

/// A byte range within a source buffer
#[derive(Debug, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Span {
    offset: usize,
    len: usize,
}

impl Span {
    /// Creates a new span
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Gets a span directly after this span
    pub const fn end(&self) -> Self {
        Self {
            offset: self.offset + self.len,
            len: 0,
        }
    }

    /// Creates a span that encompasses both
    pub fn join(&self, other: Self) -> Self {
        let min = self.offset.min(other.offset);
        let max = (self.offset + self.len).max(other.offset + other.len);
        Self {
            offset: min,
            len: max - min,
        }
    }

    /// Checks if the given byte offset lies within this span.
    ///
    /// Empty spans contain only their own offset.
    pub fn contains(&self, offset: usize) -> bool {
        if self.len == 0 {
            offset == self.offset
        } else {
            self.offset <= offset && offset < self.offset + self.len
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The byte range of this span
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Gets the 1-based line and 0-based column of the start of this span within `src`
    pub fn line_col(&self, src: &str) -> (usize, usize) {
        let mut line = 1usize;
        let mut col = 0usize;
        for (idx, char) in src.char_indices() {
            if idx >= self.offset {
                break;
            }
            if char == '\n' {
                col = 0;
                line += 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}

impl From<Range<usize>> for Span {
    fn from(value: Range<usize>) -> Self {
        Self::new(value.start, value.end.saturating_sub(value.start))
    }
}

/// A line reader struct that's responsible for getting lines from a span
#[derive(Debug, Default)]
pub struct LineReader {
    before: usize,
    after: usize,
}

impl LineReader {
    /// Creates a new line reader that gets `before` number of lines before a span and `after` number
    /// of lines after.
    pub fn new(before: usize, after: usize) -> Self {
        Self { before, after }
    }

    /// Gets the lines for a given span within `src`, plus the base line index.
    ///
    /// Returns `None` if the span does not start within `src`.
    pub fn lines(&self, src: &str, span: &Span) -> Option<(Vec<Line>, usize)> {
        if span.offset > src.len() {
            return None;
        }
        let (base_line, base_col) = span.line_col(src);
        let range = base_line.saturating_sub(self.before)..=base_line.saturating_add(self.after);

        let mut lines = vec![];
        let mut byte_offset = 0usize;
        for (idx, src) in src.split('\n').enumerate() {
            let line = idx + 1;
            if range.contains(&line) {
                lines.push(Line {
                    line,
                    col: if line == base_line { base_col } else { 0 },
                    byte_offset,
                    src: src.to_string(),
                });
            }
            byte_offset += src.len() + 1;
        }

        Some((lines, base_line))
    }
}

#[derive(Debug)]
pub struct Line {
    pub line: usize,
    pub col: usize,
    pub byte_offset: usize,
    pub src: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_span_end() {
        let p = Span::new(0, 5).end();
        assert_eq!(p.offset(), 5);
        assert_eq!(p.len(), 0);
    }

    #[test]
    fn test_span_is_spanned() {
        let p = Span::new(3, 2).span();
        assert_eq!(p, Span::new(3, 2));
    }

    #[test]
    fn test_join() {
        let p1 = Span::new(0, 8);
        let p2 = Span::new(16, 8);
        assert_eq!(p1.join(p2), Span::new(0, 24));
        assert_eq!(p2.join(p1), Span::new(0, 24));
    }

    #[test]
    fn test_contains() {
        let span = Span::new(4, 3);
        assert!(!span.contains(3));
        assert!(span.contains(4));
        assert!(span.contains(6));
        assert!(!span.contains(7));
        assert!(Span::new(9, 0).contains(9));
    }

    #[test]
    fn test_line_col() {
        let src = "use fmt;\n\nexport fn main() void = void;\n";
        let span = Span::new(src.find("main").unwrap(), 4);
        assert_eq!(span.line_col(src), (3, 10));
    }

    #[test]
    fn test_line_reader() {
        let src = "a\nb\nc\nd\ne\nf";
        let span = Span::new(src.find('d').unwrap(), 1);
        let (lines, base) = LineReader::new(2, 1).lines(src, &span).unwrap();
        assert_eq!(base, 4);
        assert_eq!(
            lines.iter().map(|l| l.src.as_str()).collect::<Vec<_>>(),
            ["b", "c", "d", "e"]
        );
        assert!(LineReader::new(0, 0).lines(src, &Span::new(100, 0)).is_none());
    }
}
