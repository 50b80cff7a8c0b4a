//! Source positions inside a build script.
//!
//! Elements remember the byte range they were parsed from so diagnostics can
//! point back into the script. Ranges are converted to 1-indexed line/column
//! pairs only when a diagnostic is rendered.

use std::fmt;

pub use text_size::TextRange;
pub use text_size::TextSize;

/// A line and column position in a build script.
///
/// Both are stored 0-indexed and displayed 1-indexed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct LineCol {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column in UTF-8 bytes
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// 1-indexed line number, as shown to users.
    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    /// 1-indexed column number, as shown to users.
    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

/// Maps byte offsets of a script to line/column positions.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Offset of the first byte of every line.
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(TextSize::from(0))
            .chain(
                text.match_indices('\n')
                    .map(|(offset, _)| TextSize::from(offset as u32 + 1)),
            )
            .collect();
        Self { line_starts }
    }

    /// Position of `offset`. Offsets past the end land on the last line.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line];
        LineCol::new(line as u32, col.into())
    }

    /// Position of the start of `range`.
    pub fn start_of(&self, range: TextRange) -> LineCol {
        self.line_col(range.start())
    }

    /// Number of lines, counting a trailing empty line.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}

/// Builds a [`TextRange`] from a lexer byte span.
#[inline]
pub fn range_of(span: std::ops::Range<usize>) -> TextRange {
    TextRange::new(TextSize::from(span.start as u32), TextSize::from(span.end as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_display_is_one_indexed() {
        assert_eq!(LineCol::new(0, 0).to_string(), "1:1");
        assert_eq!(LineCol::new(3, 7).to_string(), "4:8");
    }

    #[test]
    fn test_line_index_over_script() {
        let index = LineIndex::new("android {\n    namespace 'a'\n}\n");

        assert_eq!(index.len(), 4);
        assert_eq!(index.line_col(TextSize::from(0)), LineCol::new(0, 0));
        assert_eq!(index.line_col(TextSize::from(14)), LineCol::new(1, 4));
        assert_eq!(index.line_col(TextSize::from(28)), LineCol::new(2, 0));
    }

    #[test]
    fn test_start_of_range() {
        let index = LineIndex::new("a = 1\nb = 2");
        let range = range_of(6..11);

        assert_eq!(index.start_of(range), LineCol::new(1, 0));
    }
}
