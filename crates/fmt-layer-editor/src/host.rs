//! Editor collaborator interfaces.
//!
//! The formatting layer never owns an editor. Hosts expose their inlay and folding models through
//! these traits, and every element the layer creates carries a [`LayerTag`] so it can be found and
//! removed again without touching elements owned by anyone else.

use std::ops::Range;

use fmt_layer::FormattingStyle;

/// Ownership tag attached to inlays and fold regions.
///
/// This mirrors `DecorationLayerId`: replacing one layer must never affect another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerTag(pub u32);

impl LayerTag {
    /// Elements created by the visual formatting layer.
    pub const VISUAL_FORMATTING: Self = Self(0x0500_0001);

    /// Create a tag from a raw identifier.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier of an editor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditorId(pub u64);

/// Handle of an inlay created through [`InlayModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InlayId(pub u64);

/// Handle of a fold region created through [`FoldingModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FoldId(pub u64);

/// Inline and block inlays of an editor.
pub trait InlayModel {
    /// Add `columns` blank columns at `offset`. `None` if the host rejects the inlay.
    fn add_inline_inlay(
        &mut self,
        offset: usize,
        columns: usize,
        owner: LayerTag,
    ) -> Option<InlayId>;

    /// Add `lines` blank lines above the line containing `offset`.
    fn add_block_inlay(&mut self, offset: usize, lines: usize, owner: LayerTag) -> Option<InlayId>;

    /// Inlays owned by `owner` whose anchor lies in `range`.
    fn inlays_in_range(&self, range: Range<usize>, owner: LayerTag) -> Vec<InlayId>;

    /// Dispose an inlay. Returns `false` if it no longer exists.
    fn remove_inlay(&mut self, id: InlayId) -> bool;

    /// Run `update` as one batched inlay transaction (no re-layout in between).
    fn batch_inlays<R>(&mut self, update: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        update(self)
    }
}

/// Fold regions of an editor.
pub trait FoldingModel {
    /// Create a collapsed, non-editable fold region over `range` showing `placeholder`.
    fn add_fold_region(
        &mut self,
        range: Range<usize>,
        placeholder: &str,
        owner: LayerTag,
    ) -> Option<FoldId>;

    /// Fold regions owned by `owner`.
    fn fold_regions_owned_by(&self, owner: LayerTag) -> Vec<FoldId>;

    /// Dispose a fold region. Returns `false` if it no longer exists.
    fn remove_fold_region(&mut self, id: FoldId) -> bool;

    /// Run `update` as one batched folding transaction.
    fn batch_folding<R>(&mut self, update: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        update(self)
    }
}

/// A live editor view the layer can read from and decorate.
pub trait EditorView: InlayModel + FoldingModel {
    /// Identity of this editor.
    fn editor_id(&self) -> EditorId;

    /// Full text of the backing document, or `None` if there is none.
    fn document_text(&self) -> Option<String>;

    /// Stamp that changes whenever the document text changes.
    fn modification_stamp(&self) -> u64;

    /// Tab width used to display the document.
    fn tab_size(&self) -> usize;

    /// Per-editor formatting style the layer should preview, if any.
    fn style_override(&self) -> Option<FormattingStyle>;

    /// Key under which snapshots of this document are stored (usually a path).
    fn document_key(&self) -> Option<String>;
}
