//! Visual element model.
//!
//! Visual elements never modify the document text. They are anchored to character offsets in the
//! original buffer and tell the host how to make that buffer *look* reformatted:
//!
//! - inline inlays add blank columns,
//! - block inlays add blank lines,
//! - foldings hide whitespace characters.

/// A single visual-only edit produced by the formatting layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualElement {
    /// `columns` blank columns rendered at `offset`.
    InlineInlay {
        /// Anchor offset (chars).
        offset: usize,
        /// Visual width of the inlay.
        columns: usize,
    },
    /// `lines` blank lines rendered above the line containing `offset`.
    BlockInlay {
        /// Anchor offset (chars).
        offset: usize,
        /// Number of blank lines.
        lines: usize,
    },
    /// A collapsed, non-editable span `[offset, offset + length)`.
    Folding {
        /// Span start (chars).
        offset: usize,
        /// Span length (chars).
        length: usize,
    },
}

/// Discriminant used by the snapshot encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ElementKind {
    /// [`VisualElement::InlineInlay`]
    Inline = 0,
    /// [`VisualElement::BlockInlay`]
    Block = 1,
    /// [`VisualElement::Folding`]
    Folding = 2,
}

impl ElementKind {
    /// Decode a kind tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Inline),
            1 => Some(Self::Block),
            2 => Some(Self::Folding),
            _ => None,
        }
    }

    /// Encoded tag value.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl VisualElement {
    /// Rebuild an element from its flat `(kind, offset, length)` form.
    pub fn from_parts(kind: ElementKind, offset: usize, length: usize) -> Self {
        match kind {
            ElementKind::Inline => Self::InlineInlay {
                offset,
                columns: length,
            },
            ElementKind::Block => Self::BlockInlay {
                offset,
                lines: length,
            },
            ElementKind::Folding => Self::Folding { offset, length },
        }
    }

    /// Flatten into `(kind, offset, length)`.
    pub fn into_parts(self) -> (ElementKind, usize, usize) {
        match self {
            Self::InlineInlay { offset, columns } => (ElementKind::Inline, offset, columns),
            Self::BlockInlay { offset, lines } => (ElementKind::Block, offset, lines),
            Self::Folding { offset, length } => (ElementKind::Folding, offset, length),
        }
    }

    /// Element kind.
    pub fn kind(&self) -> ElementKind {
        self.into_parts().0
    }

    /// Anchor offset.
    pub fn offset(&self) -> usize {
        self.into_parts().1
    }

    /// Size in the element's own unit (columns, lines or characters).
    pub fn size(&self) -> usize {
        self.into_parts().2
    }

    /// Elements of zero size have no visible effect and are never emitted.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}
