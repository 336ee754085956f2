//! Editor Reconciler
//!
//! Replaces everything the layer previously put into an editor with a freshly computed element
//! list. Disposal always precedes creation inside the same batch, so hosts never lay out an
//! intermediate state.

use fmt_layer::VisualElement;

use crate::host::{EditorView, LayerTag};

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyReport {
    /// Inlays disposed.
    pub removed_inlays: usize,
    /// Fold regions disposed.
    pub removed_folds: usize,
    /// Inline inlays created.
    pub inline_inlays: usize,
    /// Block inlays created.
    pub block_inlays: usize,
    /// Fold regions created.
    pub folds: usize,
    /// Elements the host rejected (out of range, zero size).
    pub rejected: usize,
}

impl ApplyReport {
    /// Number of elements created.
    pub fn added(&self) -> usize {
        self.inline_inlays + self.block_inlays + self.folds
    }
}

/// Apply `elements` to `editor`, replacing every inlay and fold region tagged as owned by the
/// visual formatting layer.
///
/// Inline and block inlays are handled in one inlay batch, fold regions in one folding batch.
/// An empty list clears the layer.
pub fn apply_visual_formatting_layer_elements<E: EditorView>(
    editor: &mut E,
    elements: &[VisualElement],
    fold_placeholder: &str,
) -> ApplyReport {
    let owner = LayerTag::VISUAL_FORMATTING;
    let mut report = ApplyReport::default();

    editor.batch_inlays(|editor| {
        for id in editor.inlays_in_range(0..usize::MAX, owner) {
            if editor.remove_inlay(id) {
                report.removed_inlays += 1;
            }
        }

        for element in elements {
            if let VisualElement::InlineInlay { offset, columns } = *element {
                match editor.add_inline_inlay(offset, columns, owner) {
                    Some(_) => report.inline_inlays += 1,
                    None => report.rejected += 1,
                }
            }
        }

        for element in elements {
            if let VisualElement::BlockInlay { offset, lines } = *element {
                match editor.add_block_inlay(offset, lines, owner) {
                    Some(_) => report.block_inlays += 1,
                    None => report.rejected += 1,
                }
            }
        }
    });

    editor.batch_folding(|editor| {
        for id in editor.fold_regions_owned_by(owner) {
            if editor.remove_fold_region(id) {
                report.removed_folds += 1;
            }
        }

        for element in elements {
            if let VisualElement::Folding { offset, length } = *element {
                match editor.add_fold_region(offset..offset + length, fold_placeholder, owner) {
                    Some(_) => report.folds += 1,
                    None => report.rejected += 1,
                }
            }
        }
    });

    report
}

/// Remove everything the visual formatting layer put into `editor`.
pub fn clear_visual_formatting_layer<E: EditorView>(editor: &mut E) -> ApplyReport {
    apply_visual_formatting_layer_elements(editor, &[], "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessEditor;
    use crate::host::{EditorId, FoldingModel, InlayModel};
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<VisualElement> {
        vec![
            VisualElement::Folding {
                offset: 0,
                length: 1,
            },
            VisualElement::InlineInlay {
                offset: 1,
                columns: 2,
            },
            VisualElement::BlockInlay {
                offset: 4,
                lines: 1,
            },
        ]
    }

    #[test]
    fn test_apply_uses_one_batch_each() {
        let mut editor = HeadlessEditor::new(EditorId(1), "\tfoo\nbar");
        let report = apply_visual_formatting_layer_elements(&mut editor, &sample(), "");

        assert_eq!(report.added(), 3);
        assert_eq!(report.rejected, 0);
        assert_eq!(editor.inlay_batch_count(), 1);
        assert_eq!(editor.folding_batch_count(), 1);
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let mut editor = HeadlessEditor::new(EditorId(1), "\tfoo\nbar");
        apply_visual_formatting_layer_elements(&mut editor, &sample(), "");
        let once = editor.elements_owned_by(LayerTag::VISUAL_FORMATTING);
        let rendered = editor.render();

        let report = apply_visual_formatting_layer_elements(&mut editor, &sample(), "");
        assert_eq!(report.removed_inlays, 2);
        assert_eq!(report.removed_folds, 1);
        assert_eq!(editor.elements_owned_by(LayerTag::VISUAL_FORMATTING), once);
        assert_eq!(editor.render(), rendered);
        assert_eq!(editor.inlays().len(), 2);
        assert_eq!(editor.fold_regions().len(), 1);
    }

    #[test]
    fn test_empty_list_clears_only_owned_elements() {
        let foreign = LayerTag::new(42);
        let mut editor = HeadlessEditor::new(EditorId(1), "\tfoo\nbar");
        editor.add_inline_inlay(2, 1, foreign).unwrap();
        editor.add_fold_region(5..6, "", foreign).unwrap();

        apply_visual_formatting_layer_elements(&mut editor, &sample(), "");
        let report = clear_visual_formatting_layer(&mut editor);

        assert_eq!(report.added(), 0);
        assert_eq!(
            editor.elements_owned_by(LayerTag::VISUAL_FORMATTING),
            vec![]
        );
        assert_eq!(editor.inlays().len(), 1);
        assert_eq!(editor.fold_regions().len(), 1);
    }

    #[test]
    fn test_rejected_elements_are_counted() {
        let mut editor = HeadlessEditor::new(EditorId(1), "ab");
        let report = apply_visual_formatting_layer_elements(
            &mut editor,
            &[VisualElement::InlineInlay {
                offset: 10,
                columns: 1,
            }],
            "",
        );
        assert_eq!(report.rejected, 1);
        assert_eq!(report.added(), 0);
    }
}
