//! Line index over an immutable text.
//!
//! Both the live buffer and the reformatted snapshot are indexed the same way, so the aligner can
//! ask either side for line starts/ends using character offsets.

use ropey::Rope;
use ropey::iter::Chars;

/// Rope-backed line index.
///
/// Only `'\n'` is treated as a line break. All offsets are counted in Unicode scalar values
/// (`char`), not bytes.
#[derive(Debug, Clone)]
pub struct LineSet {
    rope: Rope,
}

impl LineSet {
    /// Build a line index from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Total line count. An empty text (or a text ending with `'\n'`) still has a last, empty line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total character count.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Line containing `offset`. Offsets past the end map to the last line.
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Offset of the first character of `line`.
    ///
    /// Lines past the end map to the end of the text.
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(line)
    }

    /// Offset just past the last character of `line`, excluding its `'\n'`.
    pub fn line_end(&self, line: usize) -> usize {
        if line + 1 >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(line + 1) - 1
    }

    /// Iterate characters starting at `offset` (clamped to the end of the text).
    pub fn chars_at(&self, offset: usize) -> Chars<'_> {
        self.rope.chars_at(offset.min(self.rope.len_chars()))
    }

    /// Character at `offset`, if any.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    /// Copy the characters in `[start, end)` into a `String`.
    pub fn slice_to_string(&self, start: usize, end: usize) -> String {
        let end = end.min(self.rope.len_chars());
        let start = start.min(end);
        self.rope.slice(start..end).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_boundaries() {
        let lines = LineSet::from_text("ab\n\ncde");
        assert_eq!(lines.line_count(), 3);
        assert_eq!((lines.line_start(0), lines.line_end(0)), (0, 2));
        assert_eq!((lines.line_start(1), lines.line_end(1)), (3, 3));
        assert_eq!((lines.line_start(2), lines.line_end(2)), (4, 7));
    }

    #[test]
    fn test_line_of_offset() {
        let lines = LineSet::from_text("ab\ncd");
        assert_eq!(lines.line_of_offset(0), 0);
        // The '\n' belongs to the line it terminates.
        assert_eq!(lines.line_of_offset(2), 0);
        assert_eq!(lines.line_of_offset(3), 1);
        assert_eq!(lines.line_of_offset(100), 1);
    }

    #[test]
    fn test_trailing_newline_has_empty_last_line() {
        let lines = LineSet::from_text("a\n");
        assert_eq!(lines.line_count(), 2);
        assert_eq!(lines.line_start(1), 2);
        assert_eq!(lines.line_end(1), 2);
    }

    #[test]
    fn test_carriage_return_is_not_a_line_break() {
        let lines = LineSet::from_text("a\rb\nc");
        assert_eq!(lines.line_count(), 2);
        assert_eq!(lines.line_end(0), 3);
    }

    #[test]
    fn test_offsets_are_chars() {
        let lines = LineSet::from_text("é\tx\nü");
        assert_eq!(lines.len_chars(), 6);
        assert_eq!(lines.line_start(1), 4);
        assert_eq!(lines.char_at(1), Some('\t'));
        assert_eq!(lines.char_at(6), None);
        assert_eq!(lines.slice_to_string(0, 3), "é\tx");
    }
}
