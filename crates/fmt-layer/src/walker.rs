//! Mismatch Walker
//!
//! Turns each whitespace [`Mismatch`] into visual elements by pairing the original lines it spans
//! with the reformatted lines it spans:
//!
//! ```text
//! n > m  (lines merge)          n < m  (lines split)          n == m
//! orig 0 ─┐                     orig 0 ── repl 0              orig 0 ── repl 0
//! orig 1 ─┴─ repl 0             (block)   repl 1              orig 1 ── repl 1
//! orig 2 ──── repl 1            orig 1 ── repl 2
//! ```
//!
//! The first line(s) are handled specially; the remaining lines are paired one to one, anchored
//! at the end of the mismatch.

use tracing::trace;

use crate::align::{LineSpan, inlay_or_fold};
use crate::detect::Mismatch;
use crate::element::VisualElement;
use crate::line_set::LineSet;

/// Compute the visual elements for one mismatch.
///
/// A mismatch that needs a single original line to be split into several visual lines yields no
/// elements: that requires soft wraps, which the layer does not drive.
pub fn formatting_elements(
    original: &LineSet,
    formatted: &LineSet,
    mismatch: &Mismatch,
    tab_size: usize,
) -> Vec<VisualElement> {
    let pre = &mismatch.pre;
    let post = &mismatch.post;

    let original_first_line = original.line_of_offset(pre.start);
    let replacement_first_line = formatted.line_of_offset(post.start);
    let n = original.line_of_offset(pre.end) - original_first_line + 1;
    let m = formatted.line_of_offset(post.end) - replacement_first_line + 1;

    if n == 1 && n < m {
        trace!(?mismatch, m, "skipping single-line split");
        return Vec::new();
    }

    let mut elements = Vec::new();

    let replacement_span = LineSpan::new(
        formatted.line_start(replacement_first_line),
        post.start,
        formatted.line_end(replacement_first_line).min(post.end),
    );

    if n > m {
        let merged_last_line = original_first_line + n - m;
        let original_span = LineSpan::new(
            original.line_start(original_first_line),
            pre.start,
            original.line_end(merged_last_line).min(pre.end),
        );
        elements.extend(inlay_or_fold(
            original,
            original_span,
            formatted,
            replacement_span,
            tab_size,
        ));
    } else {
        let original_span = LineSpan::new(
            original.line_start(original_first_line),
            pre.start,
            original.line_end(original_first_line).min(pre.end),
        );
        elements.extend(inlay_or_fold(
            original,
            original_span,
            formatted,
            replacement_span,
            tab_size,
        ));
        if m > n {
            elements.push(VisualElement::BlockInlay {
                offset: original.line_start(original_first_line + 1),
                lines: m - n,
            });
        }
    }

    let lines_to_process = n.min(m);
    for i in 1..lines_to_process {
        let original_line = original_first_line + n - lines_to_process + i;
        let replacement_line = replacement_first_line + m - lines_to_process + i;

        let original_line_start = original.line_start(original_line);
        let replacement_line_start = formatted.line_start(replacement_line);

        elements.extend(inlay_or_fold(
            original,
            LineSpan::new(
                original_line_start,
                original_line_start,
                original.line_end(original_line).min(pre.end),
            ),
            formatted,
            LineSpan::new(
                replacement_line_start,
                replacement_line_start,
                formatted.line_end(replacement_line).min(post.end),
            ),
            tab_size,
        ));
    }

    debug_assert!(
        elements.windows(2).all(|w| w[0].offset() <= w[1].offset()),
        "elements out of order for {mismatch:?}: {elements:?}"
    );

    elements
}

/// Compute the visual elements for every mismatch, in mismatch order.
///
/// The reformatted text is indexed once and shared across mismatches.
pub fn elements_for_mismatches(
    original: &LineSet,
    formatted_text: &str,
    mismatches: &[Mismatch],
    tab_size: usize,
) -> Vec<VisualElement> {
    let formatted = LineSet::from_text(formatted_text);
    mismatches
        .iter()
        .flat_map(|mismatch| formatting_elements(original, &formatted, mismatch, tab_size))
        .collect()
}
