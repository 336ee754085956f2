//! Visual formatting layer service.
//!
//! Ties the pieces together for a host:
//!
//! - **Collection**: run the detector under the editor's style override and walk every mismatch.
//! - **Stamped computation**: [`DocumentSnapshot`] is captured on the UI thread, a
//!   [`LayerComputer`] may compute elements on any thread, and
//!   [`VisualFormattingLayer::apply_computed`] applies them back on the UI thread.
//! - **Last write wins**: results computed for an outdated document, or older than what an
//!   editor already shows, are dropped as [`ApplyOutcome::Stale`].
//! - **Snapshot replay**: stored elements are replayed at most once per editor open, and only
//!   before the first live result.
//!
//! # Example
//!
//! ```rust
//! use fmt_layer::{FormattingStyle, LayerConfig, ReformatDetector};
//! use fmt_layer_editor::{ApplyOutcome, EditorId, HeadlessEditor, LayerEvent, VisualFormattingLayer};
//!
//! let detector = ReformatDetector::new(|text: &str, _: &FormattingStyle| {
//!     Some(text.replace("(  ", "("))
//! });
//! let mut layer = VisualFormattingLayer::new(detector, LayerConfig::default());
//! let mut editor = HeadlessEditor::new(EditorId(1), "call(  x)");
//!
//! let outcome = layer.handle_event(&mut editor, LayerEvent::EditorCreated);
//! assert!(matches!(outcome, ApplyOutcome::Applied(_)));
//! assert_eq!(editor.render(), "call(x)");
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use fmt_layer::{
    DEFAULT_TAB_SIZE, FormattingChangesDetector, FormattingStyle, LayerConfig, LayerError,
    LineSet, Snapshot, SnapshotStorage, VisualElement, content_fingerprint,
    elements_for_mismatches, restore_snapshot,
};
use tracing::{debug, trace, warn};

use crate::host::{EditorId, EditorView};
use crate::reconcile::{
    ApplyReport, apply_visual_formatting_layer_elements, clear_visual_formatting_layer,
};

/// Lifecycle signals that trigger a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerEvent {
    /// An editor was opened.
    EditorCreated,
    /// An editor is about to be disposed.
    EditorReleased,
    /// The editor's document text changed.
    DocumentChanged,
    /// Style settings affecting the preview changed.
    StyleSettingsChanged,
    /// The layer was switched on or off.
    Toggled(bool),
}

/// Result of handing a computation (or an event) to the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The editor now shows the new element list.
    Applied(ApplyReport),
    /// The computation was superseded; the editor was left untouched.
    Stale,
    /// The editor is not open in this layer; nothing was applied.
    NotRegistered,
}

/// Why the layer's visible state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerChangeKind {
    /// A live computation was applied.
    Computed,
    /// A stored snapshot was replayed.
    Replayed,
    /// The layer was cleared (editor released).
    Cleared,
}

/// Notification sent to subscribers after the layer changed an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerChange {
    /// The editor that changed.
    pub editor: EditorId,
    /// What happened.
    pub kind: LayerChangeKind,
    /// What was added and removed.
    pub report: ApplyReport,
}

/// Callback invoked after every visible change.
pub type LayerChangeCallback = Box<dyn FnMut(&LayerChange) + Send>;

/// Everything a computation needs from an editor, copied on the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    /// Source editor.
    pub editor: EditorId,
    /// Document text (`None` if the editor has no document).
    pub text: Option<String>,
    /// Modification stamp at capture time.
    pub stamp: u64,
    /// Display tab width.
    pub tab_size: usize,
    /// Per-editor formatting style override.
    pub style: Option<FormattingStyle>,
}

impl DocumentSnapshot {
    /// Copy the computation inputs out of `editor`.
    pub fn capture<E: EditorView>(editor: &E) -> Self {
        Self {
            editor: editor.editor_id(),
            text: editor.document_text(),
            stamp: editor.modification_stamp(),
            tab_size: editor.tab_size(),
            style: editor.style_override(),
        }
    }
}

/// A finished computation, ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedLayer {
    /// Target editor.
    pub editor: EditorId,
    /// Document stamp the elements were computed for.
    pub stamp: u64,
    /// Monotonic computation number, used to order results with equal stamps.
    pub generation: u64,
    /// Fingerprint of the text the elements were computed for.
    pub fingerprint: Option<u64>,
    /// The elements.
    pub elements: Vec<VisualElement>,
}

/// The thread-safe computing half of the layer.
///
/// Cloning is cheap; clones share the detector and the generation counter.
pub struct LayerComputer<D> {
    detector: Arc<D>,
    generation: Arc<AtomicU64>,
    enabled: bool,
    default_tab_size: usize,
}

impl<D> Clone for LayerComputer<D> {
    fn clone(&self) -> Self {
        Self {
            detector: Arc::clone(&self.detector),
            generation: Arc::clone(&self.generation),
            enabled: self.enabled,
            default_tab_size: self.default_tab_size,
        }
    }
}

impl<D: FormattingChangesDetector> LayerComputer<D> {
    /// Compute the elements for a captured document.
    ///
    /// Produces an empty list when the layer is disabled, the editor has no document or no
    /// style override, or the detector reports no changes.
    pub fn compute(&self, document: &DocumentSnapshot) -> ComputedLayer {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let elements = if self.enabled {
            elements_for_document(&*self.detector, document, self.default_tab_size)
        } else {
            Vec::new()
        };

        trace!(
            editor = ?document.editor,
            stamp = document.stamp,
            generation,
            elements = elements.len(),
            "computed visual formatting layer"
        );

        ComputedLayer {
            editor: document.editor,
            stamp: document.stamp,
            generation,
            fingerprint: document.text.as_deref().map(content_fingerprint),
            elements,
        }
    }
}

/// Compute the visual formatting layer of `editor` under its style override.
///
/// Empty when the editor has no document or no style override, or when `detector` reports no
/// changes. An editor tab size of 0 falls back to [`DEFAULT_TAB_SIZE`].
pub fn collect_visual_formatting_layer_elements<E, D>(editor: &E, detector: &D) -> Vec<VisualElement>
where
    E: EditorView,
    D: FormattingChangesDetector + ?Sized,
{
    elements_for_document(detector, &DocumentSnapshot::capture(editor), DEFAULT_TAB_SIZE)
}

fn elements_for_document<D: FormattingChangesDetector + ?Sized>(
    detector: &D,
    document: &DocumentSnapshot,
    default_tab_size: usize,
) -> Vec<VisualElement> {
    let tab_size = match document.tab_size {
        0 => default_tab_size,
        tab_size => tab_size,
    };
    let (Some(text), Some(style)) = (document.text.as_deref(), document.style.as_ref()) else {
        return Vec::new();
    };
    let Some(changes) = detector.detect(text, style) else {
        return Vec::new();
    };
    elements_for_mismatches(
        &LineSet::from_text(text),
        &changes.formatted_text,
        &changes.mismatches,
        tab_size,
    )
}

#[derive(Debug, Default)]
struct EditorState {
    /// Generation of the last applied live computation.
    applied_generation: Option<u64>,
    /// Whether the one replay chance of this editor open has been used.
    replay_done: bool,
}

/// The visual formatting layer of a set of editors.
pub struct VisualFormattingLayer<D> {
    computer: LayerComputer<D>,
    config: LayerConfig,
    storage: Option<Box<dyn SnapshotStorage>>,
    editors: HashMap<EditorId, EditorState>,
    callbacks: Vec<LayerChangeCallback>,
}

impl<D: FormattingChangesDetector> VisualFormattingLayer<D> {
    /// Create a layer around `detector`.
    pub fn new(detector: D, config: LayerConfig) -> Self {
        let enabled = config.enabled;
        Self {
            computer: LayerComputer {
                detector: Arc::new(detector),
                generation: Arc::new(AtomicU64::new(0)),
                enabled,
                default_tab_size: config.default_tab_size,
            },
            config,
            storage: None,
            editors: HashMap::new(),
            callbacks: Vec::new(),
        }
    }

    /// Create a layer from a JSON configuration.
    pub fn from_json_config(detector: D, json: &str) -> Result<Self, LayerError> {
        let config = LayerConfig::from_json_str(json)?;
        Ok(Self::new(detector, config))
    }

    /// Store computed elements in `storage` and replay them on the next editor open.
    pub fn with_snapshot_storage(mut self, storage: impl SnapshotStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Whether the layer is shown.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// The formatting-changes detector.
    pub fn detector(&self) -> &D {
        &self.computer.detector
    }

    /// The snapshot storage, if any.
    pub fn snapshot_storage(&self) -> Option<&dyn SnapshotStorage> {
        self.storage.as_deref()
    }

    /// A handle that can compute off the UI thread.
    pub fn computer(&self) -> LayerComputer<D> {
        self.computer.clone()
    }

    /// Whether `editor` is open in this layer.
    pub fn is_registered(&self, editor: EditorId) -> bool {
        self.editors.contains_key(&editor)
    }

    /// Subscribe to visible changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&LayerChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Compute the element list for `editor` right now, ignoring whether the layer is enabled.
    ///
    /// Empty when the editor has no document or no style override, or when reformatting changes
    /// nothing.
    pub fn collect_elements<E: EditorView>(&self, editor: &E) -> Vec<VisualElement> {
        elements_for_document(
            &*self.computer.detector,
            &DocumentSnapshot::capture(editor),
            self.config.default_tab_size,
        )
    }

    /// Compute a stamped result for a captured document.
    pub fn compute(&self, document: &DocumentSnapshot) -> ComputedLayer {
        self.computer.compute(document)
    }

    /// Start tracking `editor` without replaying anything.
    pub fn register_editor(&mut self, editor: EditorId) {
        self.editors.entry(editor).or_default();
    }

    /// Register `editor` and replay its stored snapshot, if there is one.
    ///
    /// Returns whether a snapshot was replayed.
    pub fn open_editor<E: EditorView>(&mut self, editor: &mut E) -> bool {
        self.register_editor(editor.editor_id());
        self.replay_snapshot(editor)
    }

    /// Replay the stored snapshot of `editor`.
    ///
    /// Happens at most once per editor open, never after a live result was applied, and only if
    /// the snapshot was computed for the current text.
    pub fn replay_snapshot<E: EditorView>(&mut self, editor: &mut E) -> bool {
        if !self.config.enabled {
            return false;
        }
        let Some(state) = self.editors.get_mut(&editor.editor_id()) else {
            return false;
        };
        if state.replay_done || state.applied_generation.is_some() {
            return false;
        }
        state.replay_done = true;

        let (Some(storage), Some(key), Some(text)) = (
            self.storage.as_deref(),
            editor.document_key(),
            editor.document_text(),
        ) else {
            return false;
        };
        let Some(elements) = restore_snapshot(storage, &key, &text) else {
            return false;
        };

        let report =
            apply_visual_formatting_layer_elements(editor, &elements, &self.config.fold_placeholder);
        debug!(editor = ?editor.editor_id(), key, elements = elements.len(), "replayed snapshot");
        self.notify(editor.editor_id(), LayerChangeKind::Replayed, report);
        true
    }

    /// Apply a computation, unless it has been superseded.
    pub fn apply_computed<E: EditorView>(
        &mut self,
        editor: &mut E,
        computed: ComputedLayer,
    ) -> ApplyOutcome {
        let editor_id = editor.editor_id();
        debug_assert_eq!(computed.editor, editor_id, "computation applied to another editor");

        let Some(state) = self.editors.get_mut(&editor_id) else {
            return ApplyOutcome::NotRegistered;
        };

        let outdated_text = computed.stamp != editor.modification_stamp();
        let superseded = state
            .applied_generation
            .is_some_and(|applied| computed.generation < applied);
        let disabled_since = !self.config.enabled && !computed.elements.is_empty();
        if outdated_text || superseded || disabled_since {
            trace!(
                editor = ?editor_id,
                stamp = computed.stamp,
                generation = computed.generation,
                outdated_text,
                superseded,
                "dropping stale computation"
            );
            return ApplyOutcome::Stale;
        }

        state.applied_generation = Some(computed.generation);
        state.replay_done = true;

        let report = apply_visual_formatting_layer_elements(
            editor,
            &computed.elements,
            &self.config.fold_placeholder,
        );
        debug!(
            editor = ?editor_id,
            stamp = computed.stamp,
            added = report.added(),
            removed = report.removed_inlays + report.removed_folds,
            "applied visual formatting layer"
        );

        self.persist(editor, &computed);
        self.notify(editor_id, LayerChangeKind::Computed, report);
        ApplyOutcome::Applied(report)
    }

    /// Capture, compute and apply synchronously.
    pub fn refresh<E: EditorView>(&mut self, editor: &mut E) -> ApplyOutcome {
        let computed = self.compute(&DocumentSnapshot::capture(editor));
        self.apply_computed(editor, computed)
    }

    /// React to a lifecycle signal for `editor`.
    pub fn handle_event<E: EditorView>(&mut self, editor: &mut E, event: LayerEvent) -> ApplyOutcome {
        trace!(editor = ?editor.editor_id(), ?event, "layer event");
        match event {
            LayerEvent::EditorCreated => {
                self.open_editor(editor);
                self.refresh(editor)
            }
            LayerEvent::EditorReleased => self.release_editor(editor),
            LayerEvent::DocumentChanged | LayerEvent::StyleSettingsChanged => self.refresh(editor),
            LayerEvent::Toggled(enabled) => {
                self.set_enabled(enabled);
                self.refresh(editor)
            }
        }
    }

    /// Switch the layer on or off. Open editors pick the change up on their next refresh.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        self.computer.enabled = enabled;
    }

    /// Remove every layer element from `editor` and forget it.
    pub fn release_editor<E: EditorView>(&mut self, editor: &mut E) -> ApplyOutcome {
        let editor_id = editor.editor_id();
        if self.editors.remove(&editor_id).is_none() {
            return ApplyOutcome::NotRegistered;
        }
        let report = clear_visual_formatting_layer(editor);
        debug!(editor = ?editor_id, "released editor");
        self.notify(editor_id, LayerChangeKind::Cleared, report);
        ApplyOutcome::Applied(report)
    }

    fn persist<E: EditorView>(&mut self, editor: &E, computed: &ComputedLayer) {
        if !self.config.enabled || !self.config.persist_snapshots {
            return;
        }
        let (Some(storage), Some(key), Some(fingerprint)) = (
            self.storage.as_deref_mut(),
            editor.document_key(),
            computed.fingerprint,
        ) else {
            return;
        };

        let snapshot = Snapshot {
            fingerprint,
            elements: computed.elements.clone(),
        };
        let result = snapshot
            .encode()
            .and_then(|bytes| storage.store(&key, bytes));
        if let Err(err) = result {
            warn!(key, %err, "failed to store snapshot");
        }
    }

    fn notify(&mut self, editor: EditorId, kind: LayerChangeKind, report: ApplyReport) {
        let change = LayerChange {
            editor,
            kind,
            report,
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}
