//! Column Accountant
//!
//! Converts a character offset range into a tab-aware visual column count. Tab stops are always
//! measured from the true start of the line, never from an arbitrary substring start.

use crate::line_set::LineSet;

/// Tab width used when a caller does not specify one.
pub const DEFAULT_TAB_SIZE: usize = 4;

/// Result of counting visual columns over a character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnCount {
    /// Visual columns covered by the scanned range.
    pub columns: usize,
    /// Whether a `'\t'` was encountered in the scanned range.
    pub has_tabs: bool,
}

/// Count visual columns in `[from, until)`, starting at visual column `start_column`.
///
/// - `'\t'` advances to the next tab stop and resets the tab-stop remainder.
/// - `'\n'` terminates the scan.
/// - Any other character is one column wide.
///
/// A `tab_size` of 0 is treated as 1.
pub fn count_columns(
    text: &LineSet,
    from: usize,
    until: usize,
    start_column: usize,
    tab_size: usize,
) -> ColumnCount {
    let tab_size = tab_size.max(1);
    let until = until.min(text.len_chars());
    if from >= until {
        return ColumnCount::default();
    }

    let mut count = ColumnCount::default();
    let mut remainder = start_column % tab_size;

    for ch in text.chars_at(from).take(until - from) {
        match ch {
            '\n' => break,
            '\t' => {
                count.columns += tab_size - remainder;
                count.has_tabs = true;
                remainder = 0;
            }
            _ => {
                count.columns += 1;
                remainder = (remainder + 1) % tab_size;
            }
        }
    }

    count
}

/// Count visual columns in `[from, until)` where `from` lies on the line starting at `line_start`.
///
/// The column of `from` is computed first by scanning `[line_start, from)`, so tab stops inside
/// the range line up with the line start.
pub fn count_columns_within_line(
    text: &LineSet,
    line_start: usize,
    from: usize,
    until: usize,
    tab_size: usize,
) -> ColumnCount {
    debug_assert!(line_start <= from, "range starts before its line");
    let start_column = count_columns(text, line_start, from, 0, tab_size).columns;
    count_columns(text, from, until, start_column, tab_size)
}

/// Expand every `'\t'` to spaces, tracking tab stops per line.
pub fn expand_tabs(text: &str, tab_size: usize) -> String {
    let tab_size = tab_size.max(1);
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;

    for ch in text.chars() {
        match ch {
            '\t' => {
                let width = tab_size - column % tab_size;
                out.extend(std::iter::repeat_n(' ', width));
                column += width;
            }
            '\n' => {
                out.push('\n');
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(text: &str, from: usize, until: usize, start_column: usize) -> ColumnCount {
        count_columns(&LineSet::from_text(text), from, until, start_column, 4)
    }

    #[test]
    fn test_plain_characters_are_one_column() {
        assert_eq!(
            count("    foo", 0, 4, 0),
            ColumnCount {
                columns: 4,
                has_tabs: false
            }
        );
    }

    #[test]
    fn test_tab_advances_to_next_stop() {
        assert_eq!(count("\tx", 0, 1, 0).columns, 4);
        // Starting at column 1, the tab only covers three columns.
        assert_eq!(count("\tx", 0, 1, 1).columns, 3);
        assert!(count("\tx", 0, 1, 0).has_tabs);
    }

    #[test]
    fn test_tab_after_characters_resets_remainder() {
        // " \t \t" -> 1, tab to 4, 1, tab to 8
        assert_eq!(count(" \t \t", 0, 4, 0).columns, 8);
    }

    #[test]
    fn test_newline_terminates_scan() {
        assert_eq!(count("  \n    ", 0, 7, 0).columns, 2);
    }

    #[test]
    fn test_empty_and_inverted_ranges() {
        assert_eq!(count("abc", 2, 2, 0), ColumnCount::default());
        assert_eq!(count("abc", 3, 1, 0), ColumnCount::default());
    }

    #[test]
    fn test_within_line_uses_line_start_for_tab_stops() {
        let text = LineSet::from_text("first\nab\tc");
        // Line 1 starts at 6; "ab" puts the tab at column 2, so it is two columns wide.
        let counted = count_columns_within_line(&text, 6, 8, 9, 4);
        assert_eq!(counted.columns, 2);
        assert!(counted.has_tabs);
    }

    #[test]
    fn test_zero_tab_size_is_treated_as_one() {
        let text = LineSet::from_text("\t\t");
        assert_eq!(count_columns(&text, 0, 2, 0, 0).columns, 2);
    }

    #[test]
    fn test_expand_tabs() {
        assert_eq!(expand_tabs("\tfoo\nab\tc", 4), "    foo\nab  c");
    }
}
