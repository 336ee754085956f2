#![warn(missing_docs)]
//! fmt-layer-editor - applies the visual formatting layer to live editors
//!
//! `fmt-layer` computes visual elements; this crate puts them into an editor and keeps them
//! current:
//!
//! - [`host`] - the editor collaborator traits (`InlayModel`, `FoldingModel`, `EditorView`)
//! - [`reconcile`] - replaces the layer's elements in one batch per model
//! - [`service`] - lifecycle events, stamped computation and snapshot replay
//! - [`headless`] - an in-memory editor view that can render what a user would see

pub mod headless;
pub mod host;
pub mod reconcile;
pub mod service;

pub use headless::{FoldRegion, HeadlessEditor, Inlay, InlayKind};
pub use host::{EditorId, EditorView, FoldId, FoldingModel, InlayId, InlayModel, LayerTag};
pub use reconcile::{ApplyReport, apply_visual_formatting_layer_elements, clear_visual_formatting_layer};
pub use service::{
    ApplyOutcome, ComputedLayer, DocumentSnapshot, LayerChange, LayerChangeCallback,
    LayerChangeKind, LayerComputer, LayerEvent, VisualFormattingLayer,
    collect_visual_formatting_layer_elements,
};
