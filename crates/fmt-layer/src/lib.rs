#![warn(missing_docs)]
//! fmt-layer - visual-only formatting for editor buffers
//!
//! # Overview
//!
//! `fmt-layer` computes a list of visual elements (inline inlays, block inlays and collapsed
//! folds) that make an original buffer *appear* reformatted without touching its text. The
//! reformatted text and the whitespace differences come from an external formatter; this crate
//! only aligns the two and decides how to bridge every difference.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Detection (formatter + whitespace diff)    │  ← FormattingChangesDetector
//! ├─────────────────────────────────────────────┤
//! │  Mismatch Walker (line pairing)             │  ← formatting_elements
//! ├─────────────────────────────────────────────┤
//! │  Line Aligner (inlay or fold)               │  ← inlay_or_fold
//! ├─────────────────────────────────────────────┤
//! │  Column Accountant (tab-aware widths)       │  ← count_columns
//! ├─────────────────────────────────────────────┤
//! │  Line Set (Rope-based)                      │  ← LineSet
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Computed element lists can be persisted with the [`persistence`] module and replayed before
//! the next live computation completes. Applying elements to a live editor lives in the
//! `fmt-layer-editor` crate.
//!
//! # Quick Start
//!
//! ```rust
//! use fmt_layer::{FormattingStyle, FormattingChangesDetector, LineSet, ReformatDetector,
//!     VisualElement, elements_for_mismatches};
//!
//! // A "formatter" that indents every non-empty line with four spaces.
//! let detector = ReformatDetector::new(|text: &str, _style: &FormattingStyle| {
//!     let lines: Vec<String> = text
//!         .lines()
//!         .map(|l| if l.trim().is_empty() { String::new() } else { format!("    {}", l.trim_start()) })
//!         .collect();
//!     Some(lines.join("\n"))
//! });
//!
//! let original = "  a\n  b";
//! let changes = detector.detect(original, &FormattingStyle::default()).unwrap();
//! let elements = elements_for_mismatches(
//!     &LineSet::from_text(original),
//!     &changes.formatted_text,
//!     &changes.mismatches,
//!     4,
//! );
//!
//! assert_eq!(elements, vec![
//!     VisualElement::InlineInlay { offset: 2, columns: 2 },
//!     VisualElement::InlineInlay { offset: 6, columns: 2 },
//! ]);
//! ```
//!
//! # Module Description
//!
//! - [`columns`] - tab-aware column counting
//! - [`line_set`] - line index over original and reformatted text
//! - [`element`] - the visual element model
//! - [`align`] - inlay-or-fold decision for one line pair
//! - [`walker`] - per-mismatch line pairing
//! - [`detect`] - formatting-changes detection and whitespace diff
//! - [`persistence`] - versioned snapshot encoding and storage
//! - [`config`] - layer configuration

pub mod align;
pub mod columns;
pub mod config;
pub mod detect;
pub mod element;
pub mod error;
pub mod line_set;
pub mod persistence;
pub mod walker;

pub use align::{LineSpan, inlay_or_fold};
pub use columns::{
    ColumnCount, DEFAULT_TAB_SIZE, count_columns, count_columns_within_line, expand_tabs,
};
pub use config::LayerConfig;
pub use detect::{
    FormattingChanges, FormattingChangesDetector, FormattingStyle, Formatter, Mismatch,
    ReformatDetector, whitespace_mismatches,
};
pub use element::{ElementKind, VisualElement};
pub use error::{ConfigError, DetectError, LayerError, SnapshotError};
pub use line_set::LineSet;
pub use persistence::{
    FileSnapshotStorage, MemorySnapshotStorage, SNAPSHOT_VERSION, Snapshot, SnapshotStorage,
    content_fingerprint, restore_snapshot, save_snapshot,
};
pub use walker::{elements_for_mismatches, formatting_elements};
