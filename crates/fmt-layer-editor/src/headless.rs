//! Headless editor view.
//!
//! An in-memory [`EditorView`] for hosts without their own inlay/folding models, and for tests.
//! It keeps owned inlays and fold regions in sorted vectors, counts batch transactions, and can
//! render what a user would see with all collapsed folds and inlays applied.

use std::ops::Range;

use fmt_layer::{FormattingStyle, LineSet, VisualElement};

use crate::host::{EditorId, EditorView, FoldId, FoldingModel, InlayId, InlayModel, LayerTag};

/// Kind and size of a headless inlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlayKind {
    /// Blank columns inside a line.
    Inline {
        /// Width in columns.
        columns: usize,
    },
    /// Blank lines above a line.
    Block {
        /// Number of lines.
        lines: usize,
    },
}

/// An inlay stored by [`HeadlessEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inlay {
    /// Handle.
    pub id: InlayId,
    /// Anchor offset (chars).
    pub offset: usize,
    /// Kind and size.
    pub kind: InlayKind,
    /// Owning layer.
    pub owner: LayerTag,
}

/// A fold region stored by [`HeadlessEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRegion {
    /// Handle.
    pub id: FoldId,
    /// Folded range (chars, half-open).
    pub range: Range<usize>,
    /// Text shown instead of the folded range.
    pub placeholder: String,
    /// Whether folded.
    pub is_collapsed: bool,
    /// Whether the user may expand or edit the region.
    pub is_editable: bool,
    /// Owning layer.
    pub owner: LayerTag,
}

/// In-memory editor view.
pub struct HeadlessEditor {
    id: EditorId,
    text: Option<String>,
    stamp: u64,
    tab_size: usize,
    style_override: Option<FormattingStyle>,
    document_key: Option<String>,
    /// Sorted by `(offset, id)`.
    inlays: Vec<Inlay>,
    /// Sorted by `(range.start, id)`.
    folds: Vec<FoldRegion>,
    next_handle: u64,
    inlay_batches: usize,
    folding_batches: usize,
}

impl HeadlessEditor {
    /// Create an editor over `text` with a default formatting style override.
    pub fn new(id: EditorId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: Some(text.into()),
            stamp: 0,
            tab_size: fmt_layer::DEFAULT_TAB_SIZE,
            style_override: Some(FormattingStyle::default()),
            document_key: None,
            inlays: Vec::new(),
            folds: Vec::new(),
            next_handle: 1,
            inlay_batches: 0,
            folding_batches: 0,
        }
    }

    /// Create an editor that has no backing document.
    pub fn without_document(id: EditorId) -> Self {
        let mut editor = Self::new(id, "");
        editor.text = None;
        editor
    }

    /// Set the display tab width reported to the layer. Rendering treats 0 as 1.
    pub fn with_tab_size(mut self, tab_size: usize) -> Self {
        self.tab_size = tab_size;
        self
    }

    /// Set (or clear) the per-editor formatting style override.
    pub fn with_style_override(mut self, style: Option<FormattingStyle>) -> Self {
        self.style_override = style;
        self
    }

    /// Set the snapshot key of the document.
    pub fn with_document_key(mut self, key: impl Into<String>) -> Self {
        self.document_key = Some(key.into());
        self
    }

    /// Replace the document text and bump the modification stamp.
    ///
    /// Existing inlays and folds are kept; their owners are expected to recompute.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
        self.stamp += 1;
    }

    /// Replace the formatting style override.
    pub fn set_style_override(&mut self, style: Option<FormattingStyle>) {
        self.style_override = style;
    }

    /// Current document text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// All inlays, in offset order.
    pub fn inlays(&self) -> &[Inlay] {
        &self.inlays
    }

    /// All fold regions, in start order.
    pub fn fold_regions(&self) -> &[FoldRegion] {
        &self.folds
    }

    /// Number of batched inlay transactions run so far.
    pub fn inlay_batch_count(&self) -> usize {
        self.inlay_batches
    }

    /// Number of batched folding transactions run so far.
    pub fn folding_batch_count(&self) -> usize {
        self.folding_batches
    }

    /// Rebuild the visual elements owned by `owner`, in offset order.
    ///
    /// At equal offsets block inlays come first, then foldings, then inline inlays, matching the
    /// order the layer emits them.
    pub fn elements_owned_by(&self, owner: LayerTag) -> Vec<VisualElement> {
        let folds = self
            .folds
            .iter()
            .filter(|f| f.owner == owner)
            .map(|f| VisualElement::Folding {
                offset: f.range.start,
                length: f.range.end - f.range.start,
            });
        let inlays = self
            .inlays
            .iter()
            .filter(|i| i.owner == owner)
            .map(|i| match i.kind {
                InlayKind::Inline { columns } => VisualElement::InlineInlay {
                    offset: i.offset,
                    columns,
                },
                InlayKind::Block { lines } => VisualElement::BlockInlay {
                    offset: i.offset,
                    lines,
                },
            });

        let mut elements: Vec<VisualElement> = folds.chain(inlays).collect();
        elements.sort_by_key(|e| {
            let rank = match e {
                VisualElement::BlockInlay { .. } => 0,
                VisualElement::Folding { .. } => 1,
                VisualElement::InlineInlay { .. } => 2,
            };
            (e.offset(), rank)
        });
        elements
    }

    /// Render the document the way it is displayed: collapsed folds show their placeholder,
    /// inline inlays render as spaces, block inlays as blank lines, and tabs are expanded.
    pub fn render(&self) -> String {
        let Some(text) = self.text.as_deref() else {
            return String::new();
        };
        let lines = LineSet::from_text(text);
        let chars: Vec<char> = text.chars().collect();
        let tab_size = self.tab_size.max(1);

        let mut out = String::with_capacity(text.len());
        let mut column = 0usize;
        let mut offset = 0usize;
        let mut at_line_start = true;

        loop {
            if at_line_start {
                for inlay in &self.inlays {
                    if let InlayKind::Block { lines: count } = inlay.kind {
                        let anchor_line_start = lines.line_start(lines.line_of_offset(inlay.offset));
                        if anchor_line_start == offset {
                            out.extend(std::iter::repeat_n('\n', count));
                        }
                    }
                }
                at_line_start = false;
            }

            for inlay in self.inlays_at(offset) {
                if let InlayKind::Inline { columns } = inlay.kind {
                    out.extend(std::iter::repeat_n(' ', columns));
                    column += columns;
                }
            }

            if let Some(fold) = self.collapsed_fold_at(offset, chars.len()) {
                out.push_str(&fold.placeholder);
                column += fold.placeholder.chars().count();
                offset = fold.range.end.min(chars.len());
                continue;
            }

            let Some(&ch) = chars.get(offset) else {
                break;
            };
            match ch {
                '\t' => {
                    let width = tab_size - column % tab_size;
                    out.extend(std::iter::repeat_n(' ', width));
                    column += width;
                }
                '\n' => {
                    out.push('\n');
                    column = 0;
                    at_line_start = true;
                }
                _ => {
                    out.push(ch);
                    column += 1;
                }
            }
            offset += 1;
        }

        out
    }

    fn inlays_at(&self, offset: usize) -> impl Iterator<Item = &Inlay> {
        let start = self.inlays.partition_point(|i| i.offset < offset);
        self.inlays[start..]
            .iter()
            .take_while(move |i| i.offset == offset)
    }

    /// Folds left past the end by a shrinking edit are skipped.
    fn collapsed_fold_at(&self, offset: usize, len: usize) -> Option<&FoldRegion> {
        self.folds
            .iter()
            .filter(|f| f.is_collapsed && f.range.start == offset && offset < len)
            .max_by_key(|f| f.range.end)
    }

    fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn insert_inlay(&mut self, offset: usize, kind: InlayKind, owner: LayerTag) -> Option<InlayId> {
        let len = self.text.as_deref()?.chars().count();
        if offset > len {
            return None;
        }
        let id = InlayId(self.next_handle());
        let pos = self.inlays.partition_point(|i| (i.offset, i.id) <= (offset, id));
        self.inlays.insert(
            pos,
            Inlay {
                id,
                offset,
                kind,
                owner,
            },
        );
        Some(id)
    }
}

impl InlayModel for HeadlessEditor {
    fn add_inline_inlay(
        &mut self,
        offset: usize,
        columns: usize,
        owner: LayerTag,
    ) -> Option<InlayId> {
        if columns == 0 {
            return None;
        }
        self.insert_inlay(offset, InlayKind::Inline { columns }, owner)
    }

    fn add_block_inlay(&mut self, offset: usize, lines: usize, owner: LayerTag) -> Option<InlayId> {
        if lines == 0 {
            return None;
        }
        self.insert_inlay(offset, InlayKind::Block { lines }, owner)
    }

    fn inlays_in_range(&self, range: Range<usize>, owner: LayerTag) -> Vec<InlayId> {
        self.inlays
            .iter()
            .filter(|i| i.owner == owner && range.contains(&i.offset))
            .map(|i| i.id)
            .collect()
    }

    fn remove_inlay(&mut self, id: InlayId) -> bool {
        if let Some(pos) = self.inlays.iter().position(|i| i.id == id) {
            self.inlays.remove(pos);
            true
        } else {
            false
        }
    }

    fn batch_inlays<R>(&mut self, update: impl FnOnce(&mut Self) -> R) -> R {
        self.inlay_batches += 1;
        update(self)
    }
}

impl FoldingModel for HeadlessEditor {
    fn add_fold_region(
        &mut self,
        range: Range<usize>,
        placeholder: &str,
        owner: LayerTag,
    ) -> Option<FoldId> {
        let len = self.text.as_deref()?.chars().count();
        if range.start >= range.end || range.end > len {
            return None;
        }
        let id = FoldId(self.next_handle());
        let pos = self
            .folds
            .partition_point(|f| (f.range.start, f.id) <= (range.start, id));
        self.folds.insert(
            pos,
            FoldRegion {
                id,
                range,
                placeholder: placeholder.to_string(),
                is_collapsed: true,
                is_editable: false,
                owner,
            },
        );
        Some(id)
    }

    fn fold_regions_owned_by(&self, owner: LayerTag) -> Vec<FoldId> {
        self.folds
            .iter()
            .filter(|f| f.owner == owner)
            .map(|f| f.id)
            .collect()
    }

    fn remove_fold_region(&mut self, id: FoldId) -> bool {
        if let Some(pos) = self.folds.iter().position(|f| f.id == id) {
            self.folds.remove(pos);
            true
        } else {
            false
        }
    }

    fn batch_folding<R>(&mut self, update: impl FnOnce(&mut Self) -> R) -> R {
        self.folding_batches += 1;
        update(self)
    }
}

impl EditorView for HeadlessEditor {
    fn editor_id(&self) -> EditorId {
        self.id
    }

    fn document_text(&self) -> Option<String> {
        self.text.clone()
    }

    fn modification_stamp(&self) -> u64 {
        self.stamp
    }

    fn tab_size(&self) -> usize {
        self.tab_size
    }

    fn style_override(&self) -> Option<FormattingStyle> {
        self.style_override.clone()
    }

    fn document_key(&self) -> Option<String> {
        self.document_key.clone()
    }
}
