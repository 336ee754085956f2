//! Formatting-changes detection.
//!
//! The layer does not format code itself. A [`FormattingChangesDetector`] returns the reformatted
//! text together with the whitespace [`Mismatch`]es between it and the original. Hosts usually
//! wrap their own formatter in a [`ReformatDetector`], which runs the formatter under a temporary
//! [`FormattingStyle`] and diffs the whitespace with [`whitespace_mismatches`].

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::columns::DEFAULT_TAB_SIZE;
use crate::error::DetectError;

/// A maximal whitespace-only difference between the original and the reformatted text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mismatch {
    /// Range in the original text (chars).
    pub pre: Range<usize>,
    /// Range in the reformatted text (chars).
    pub post: Range<usize>,
}

impl Mismatch {
    /// Create a mismatch from its two ranges.
    pub fn new(pre: Range<usize>, post: Range<usize>) -> Self {
        Self { pre, post }
    }
}

/// Style configuration applied while reformatting.
///
/// This is the per-editor override the layer formats with; the original document is never
/// reformatted in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingStyle {
    /// Width of one indentation level, in columns.
    pub indent_size: usize,
    /// Tab width the formatter assumes.
    pub tab_size: usize,
    /// Whether the formatter indents with `'\t'`.
    pub use_tab_character: bool,
    /// Extra indentation of continuation lines, in columns.
    pub continuation_indent_size: usize,
}

impl Default for FormattingStyle {
    fn default() -> Self {
        Self {
            indent_size: DEFAULT_TAB_SIZE,
            tab_size: DEFAULT_TAB_SIZE,
            use_tab_character: false,
            continuation_indent_size: 2 * DEFAULT_TAB_SIZE,
        }
    }
}

impl FormattingStyle {
    /// Indentation string for `level` levels under this style.
    pub fn indent(&self, level: usize) -> String {
        let columns = level * self.indent_size;
        if self.use_tab_character {
            let tab_size = self.tab_size.max(1);
            let mut out = "\t".repeat(columns / tab_size);
            out.push_str(&" ".repeat(columns % tab_size));
            out
        } else {
            " ".repeat(columns)
        }
    }
}

/// The result of reformatting a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingChanges {
    /// The full reformatted text.
    pub formatted_text: String,
    /// Whitespace mismatches, sorted and non-overlapping.
    pub mismatches: Vec<Mismatch>,
}

/// Produces the formatting changes of a document under a temporary style.
///
/// Returning `None` means "nothing to show", whether because the text is already formatted or
/// because the detector could not run.
pub trait FormattingChangesDetector: Send + Sync {
    /// Reformat `text` under `style` and report the whitespace differences.
    fn detect(&self, text: &str, style: &FormattingStyle) -> Option<FormattingChanges>;
}

/// A formatter that rewrites a whole document.
pub trait Formatter: Send + Sync {
    /// Format `text` under `style`. `None` when the text cannot be formatted.
    fn format(&self, text: &str, style: &FormattingStyle) -> Option<String>;
}

impl<F> Formatter for F
where
    F: Fn(&str, &FormattingStyle) -> Option<String> + Send + Sync,
{
    fn format(&self, text: &str, style: &FormattingStyle) -> Option<String> {
        self(text, style)
    }
}

/// Detector that runs a [`Formatter`] and diffs its output against the original whitespace.
pub struct ReformatDetector<F> {
    formatter: F,
}

impl<F: Formatter> ReformatDetector<F> {
    /// Wrap a formatter.
    pub fn new(formatter: F) -> Self {
        Self { formatter }
    }

    /// The wrapped formatter.
    pub fn formatter(&self) -> &F {
        &self.formatter
    }
}

impl<F: Formatter> FormattingChangesDetector for ReformatDetector<F> {
    fn detect(&self, text: &str, style: &FormattingStyle) -> Option<FormattingChanges> {
        let Some(formatted_text) = self.formatter.format(text, style) else {
            debug!("formatter produced no output");
            return None;
        };

        if formatted_text == text {
            trace!("document is already formatted");
            return None;
        }

        match whitespace_mismatches(text, &formatted_text) {
            Ok(mismatches) if mismatches.is_empty() => None,
            Ok(mismatches) => {
                debug!(mismatches = mismatches.len(), "detected formatting changes");
                Some(FormattingChanges {
                    formatted_text,
                    mismatches,
                })
            }
            Err(err) => {
                warn!(%err, "formatter changed more than whitespace");
                None
            }
        }
    }
}

fn is_layout_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Diff two texts that differ only in whitespace.
///
/// Each maximal whitespace run of the original is paired with the run at the same position in
/// the formatted text (either run may be empty). Runs with different content become mismatches.
///
/// Fails with [`DetectError::NonWhitespaceChange`] if any non-whitespace character differs.
pub fn whitespace_mismatches(original: &str, formatted: &str) -> Result<Vec<Mismatch>, DetectError> {
    let original: Vec<char> = original.chars().collect();
    let formatted: Vec<char> = formatted.chars().collect();

    let mut mismatches = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);

    loop {
        let pre_start = i;
        while i < original.len() && is_layout_whitespace(original[i]) {
            i += 1;
        }
        let post_start = j;
        while j < formatted.len() && is_layout_whitespace(formatted[j]) {
            j += 1;
        }

        if original[pre_start..i] != formatted[post_start..j] {
            mismatches.push(Mismatch::new(pre_start..i, post_start..j));
        }

        match (original.get(i), formatted.get(j)) {
            (None, None) => break,
            (Some(a), Some(b)) if a == b => {
                i += 1;
                j += 1;
            }
            _ => {
                return Err(DetectError::NonWhitespaceChange {
                    original_offset: i,
                    formatted_offset: j,
                });
            }
        }
    }

    Ok(mismatches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identical_texts_have_no_mismatches() {
        assert_eq!(whitespace_mismatches("a b\n c", "a b\n c").unwrap(), vec![]);
    }

    #[test]
    fn test_runs_are_paired_in_order() {
        let mismatches = whitespace_mismatches("a  b\n\tc", "a b\n    c").unwrap();
        assert_eq!(
            mismatches,
            vec![Mismatch::new(1..3, 1..2), Mismatch::new(4..6, 3..8)]
        );
    }

    #[test]
    fn test_empty_runs_on_either_side() {
        let mismatches = whitespace_mismatches("f(x)", "f( x )").unwrap();
        assert_eq!(
            mismatches,
            vec![Mismatch::new(2..2, 2..3), Mismatch::new(3..3, 4..5)]
        );
    }

    #[test]
    fn test_trailing_whitespace() {
        let mismatches = whitespace_mismatches("a  ", "a\n").unwrap();
        assert_eq!(mismatches, vec![Mismatch::new(1..3, 1..2)]);
    }

    #[test]
    fn test_non_whitespace_change_is_an_error() {
        let err = whitespace_mismatches("let a", "let b").unwrap_err();
        assert!(matches!(
            err,
            DetectError::NonWhitespaceChange {
                original_offset: 4,
                formatted_offset: 4
            }
        ));
        assert!(whitespace_mismatches("ab", "abc").is_err());
    }

    #[test]
    fn test_reformat_detector() {
        let detector = ReformatDetector::new(|text: &str, _: &FormattingStyle| {
            Some(text.replace("\t", "  "))
        });
        let style = FormattingStyle::default();

        assert!(detector.detect("no tabs", &style).is_none());

        let changes = detector.detect("\tx", &style).unwrap();
        assert_eq!(changes.formatted_text, "  x");
        assert_eq!(changes.mismatches, vec![Mismatch::new(0..1, 0..2)]);
    }

    #[test]
    fn test_reformat_detector_rejects_token_changes() {
        let detector =
            ReformatDetector::new(|text: &str, _: &FormattingStyle| Some(text.to_uppercase()));
        assert!(detector.detect("abc", &FormattingStyle::default()).is_none());
    }

    #[test]
    fn test_style_indent() {
        let spaces = FormattingStyle::default();
        assert_eq!(spaces.indent(2), "        ");

        let tabs = FormattingStyle {
            indent_size: 2,
            use_tab_character: true,
            ..FormattingStyle::default()
        };
        assert_eq!(tabs.indent(3), "\t  ");
    }
}
