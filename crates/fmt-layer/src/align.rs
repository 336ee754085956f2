//! Line Aligner
//!
//! Decides how to cover the width difference between an original whitespace span and its
//! reformatted counterpart. Inline inlays only ever add width; foldings only ever remove
//! characters. The two are combined only when characters must be removed but cannot be trimmed
//! one column at a time (tabs, line breaks).

use crate::columns::count_columns_within_line;
use crate::element::VisualElement;
use crate::line_set::LineSet;

/// One side of a line-pair alignment: a span `[start, end)` on the line starting at `line_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// Start offset of the line containing `start`.
    pub line_start: usize,
    /// Span start (chars).
    pub start: usize,
    /// Span end (chars, exclusive).
    pub end: usize,
}

impl LineSpan {
    /// Create a span.
    pub fn new(line_start: usize, start: usize, end: usize) -> Self {
        Self {
            line_start,
            start,
            end: end.max(start),
        }
    }

    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Compute the elements that make `original` look as wide as `replacement`.
///
/// Emits, in offset order:
/// - nothing when both spans cover the same number of columns,
/// - one inline inlay at the end of the original span when the replacement is wider,
/// - a folding of the surplus characters when the original is wider and contains only plain
///   characters,
/// - a folding of the whole original span followed by an inline inlay of the replacement width
///   when the original is wider and contains tabs, or when it crosses a line break.
pub fn inlay_or_fold(
    original: &LineSet,
    original_span: LineSpan,
    formatted: &LineSet,
    replacement_span: LineSpan,
    tab_size: usize,
) -> Vec<VisualElement> {
    let original_count = count_columns_within_line(
        original,
        original_span.line_start,
        original_span.start,
        original_span.end,
        tab_size,
    );
    let replacement_columns = count_columns_within_line(
        formatted,
        replacement_span.line_start,
        replacement_span.start,
        replacement_span.end,
        tab_size,
    )
    .columns;

    let crosses_line_break = original
        .chars_at(original_span.start)
        .take(original_span.len())
        .any(|ch| ch == '\n');

    let mut elements = Vec::with_capacity(2);

    if crosses_line_break {
        // Everything from the first line break on is invisible to the column count, so the
        // whole span is replaced.
        push_replacement(&mut elements, original_span, replacement_columns);
        return elements;
    }

    let original_columns = original_count.columns;
    if replacement_columns > original_columns {
        elements.push(VisualElement::InlineInlay {
            offset: original_span.end,
            columns: replacement_columns - original_columns,
        });
    } else if replacement_columns < original_columns {
        if original_count.has_tabs {
            push_replacement(&mut elements, original_span, replacement_columns);
        } else {
            let surplus = original_columns - replacement_columns;
            debug_assert!(
                surplus <= original_span.len(),
                "fold of {surplus} chars exceeds a {}-char span",
                original_span.len()
            );
            elements.push(VisualElement::Folding {
                offset: original_span.start,
                length: surplus,
            });
        }
    }

    elements
}

fn push_replacement(elements: &mut Vec<VisualElement>, span: LineSpan, columns: usize) {
    if span.len() > 0 {
        elements.push(VisualElement::Folding {
            offset: span.start,
            length: span.len(),
        });
    }
    if columns > 0 {
        elements.push(VisualElement::InlineInlay {
            offset: span.end,
            columns,
        });
    }
}
