//! Overlay control surface
//!
//! `Overlay` is the context object a host constructs and drives: enable and
//! disable, comment CRUD, export, visibility, the creation/edit editor, and
//! the pointer/viewport event entry points. One event loop at a time; every
//! mutation persists and redraws synchronously before returning.
//!
//! Time is explicit. The host advances the overlay's clock with
//! `tick(now_ms)` each frame; pin collapse delays and deferred editor focus
//! fire from that clock, never from wall time.

use crate::config::OverlayOptions;
use crate::drag::DragController;
use crate::editor::{EditorAction, EditorKey, EditorMode, EditorState};
use crate::layer::{OverlayLayer, PinView, TimerEvent};
use pagepin_core::export::export_comments;
use pagepin_core::store::{CommentStore, NewComment, StoreChange};
use pagepin_core::{locator, DomDocument, ElementId};
use pagepin_scheduler::TimerQueue;
use pin_model::{Comment, Point};
use storage::select_storage;
use tracing::debug;

type VisibilityListener = Box<dyn Fn(bool)>;

/// The comment overlay for one host document.
pub struct Overlay<D: DomDocument> {
    document: D,
    options: OverlayOptions,
    store: Option<CommentStore>,
    layer: OverlayLayer,
    drag: DragController,
    editor: Option<EditorState>,
    timers: TimerQueue<TimerEvent>,
    visibility_listeners: Vec<VisibilityListener>,
    clock_ms: u64,
}

impl<D: DomDocument> Overlay<D> {
    /// Construct a disabled overlay over a host document.
    pub fn new(document: D) -> Self {
        Self {
            document,
            options: OverlayOptions::default(),
            store: None,
            layer: OverlayLayer::new(),
            drag: DragController::new(),
            editor: None,
            timers: TimerQueue::new(),
            visibility_listeners: Vec::new(),
            clock_ms: 0,
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Enable the overlay: select a storage backend, restore the persisted
    /// comments, and start rendering. Enabling an already enabled overlay
    /// tears the previous session down first. The overlay starts visible
    /// without broadcasting a visibility change.
    pub fn enable(&mut self, options: OverlayOptions) {
        if self.is_enabled() {
            self.disable();
        }

        let backend = select_storage(options.storage, options.storage_root.as_deref());
        let store = CommentStore::new(backend);
        if options.debug {
            debug!(comments = store.len(), storage = ?options.storage, "overlay enabled");
        }

        self.options = options;
        self.store = Some(store);
        self.layer.set_visible(true);
        self.refresh();
    }

    /// Tear the overlay down: cancel every pending timer, drop all pins,
    /// close the editor, abort any drag, detach listeners, and release the
    /// store. Repeated enable/disable cycles leak nothing.
    pub fn disable(&mut self) {
        self.timers.clear();
        self.layer.clear(&mut self.timers);
        self.layer.set_visible(false);
        self.editor = None;
        self.drag.abort();
        self.store = None;
        self.visibility_listeners.clear();
        if self.options.debug {
            debug!("overlay disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    /// Add a comment programmatically. Returns the stored comment, or
    /// `None` when disabled or the text is empty.
    pub fn add(&mut self, new: NewComment) -> Option<Comment> {
        let comment = self.store.as_mut()?.add(new)?;
        if self.options.debug {
            debug!(id = %comment.id, "comment added");
        }
        self.refresh();
        Some(comment)
    }

    pub fn edit(&mut self, id: &str, text: &str) -> StoreChange {
        let Some(store) = self.store.as_mut() else {
            return StoreChange::NoOp;
        };
        let change = store.edit(id, text);
        if change.is_changed() {
            self.refresh();
        }
        change
    }

    pub fn delete(&mut self, id: &str) -> StoreChange {
        let Some(store) = self.store.as_mut() else {
            return StoreChange::NoOp;
        };
        let change = store.delete(id);
        if change.is_changed() {
            if self.options.debug {
                debug!(%id, "comment deleted");
            }
            self.refresh();
        }
        change
    }

    /// Detach a comment from its element anchor so it stops snapping back
    /// to the anchored position after a drag.
    pub fn clear_anchor(&mut self, id: &str) -> StoreChange {
        let Some(store) = self.store.as_mut() else {
            return StoreChange::NoOp;
        };
        let change = store.clear_anchor(id);
        if change.is_changed() {
            self.refresh();
        }
        change
    }

    /// Remove every comment and the persisted snapshot.
    pub fn clear(&mut self) {
        if let Some(store) = self.store.as_mut() {
            store.clear();
            self.refresh();
        }
    }

    /// Defensive copy of the comment list; empty while disabled.
    pub fn get_all(&self) -> Vec<Comment> {
        self.store.as_ref().map(CommentStore::all).unwrap_or_default()
    }

    /// Render the comment list in the configured export format.
    pub fn export(&self) -> String {
        export_comments(&self.get_all(), self.options.export_format)
    }

    pub fn is_visible(&self) -> bool {
        self.layer.is_visible()
    }

    pub fn show(&mut self) {
        self.set_visibility(true);
    }

    pub fn hide(&mut self) {
        self.set_visibility(false);
    }

    pub fn toggle_visibility(&mut self) {
        self.set_visibility(!self.layer.is_visible());
    }

    /// Register a callback fired with the new state whenever visibility
    /// actually changes. Detached on `disable`.
    pub fn on_visibility_change(&mut self, listener: impl Fn(bool) + 'static) {
        self.visibility_listeners.push(Box::new(listener));
    }

    fn set_visibility(&mut self, visible: bool) {
        if self.layer.is_visible() == visible {
            return;
        }
        self.layer.set_visible(visible);
        if visible {
            self.reposition();
        }
        for listener in &self.visibility_listeners {
            listener(visible);
        }
    }

    /// Open an empty editor at a placement point (viewport coordinates),
    /// optionally targeting a specific element for anchoring. Focus is
    /// deferred one tick so the host can attach the input first.
    pub fn begin_create_at(&mut self, x: f32, y: f32, target: Option<ElementId>) {
        if !self.is_enabled() {
            return;
        }
        self.editor = Some(EditorState::create_at(x, y, target));
        self.timers.schedule(self.clock_ms, 0, TimerEvent::FocusEditor);
    }

    /// Open the editor pre-filled with an existing comment's text.
    pub fn open_edit_for(&mut self, id: &str) {
        let Some(text) = self
            .store
            .as_ref()
            .and_then(|store| store.get(id))
            .map(|comment| comment.text.clone())
        else {
            return;
        };
        self.editor = Some(EditorState::edit(id, &text));
        self.timers.schedule(self.clock_ms, 0, TimerEvent::FocusEditor);
    }

    pub fn editor(&self) -> Option<&EditorState> {
        self.editor.as_ref()
    }

    /// Replace the editor draft with the host input's current value.
    pub fn editor_input(&mut self, text: impl Into<String>) {
        if let Some(editor) = self.editor.as_mut() {
            editor.set_draft(text);
        }
    }

    /// Feed a key event to the open editor. A submit with empty trimmed
    /// text leaves the editor open and the list unchanged.
    pub fn editor_key(&mut self, key: EditorKey) {
        let Some(editor) = &self.editor else {
            return;
        };
        match editor.key(key) {
            EditorAction::Submit => self.submit_editor(),
            EditorAction::Discard => self.editor = None,
            EditorAction::None => {}
        }
    }

    fn submit_editor(&mut self) {
        let Some(editor) = &self.editor else {
            return;
        };
        if !editor.can_submit() {
            return;
        }
        let draft = editor.draft().to_string();

        match editor.mode().clone() {
            EditorMode::Create { x, y, target } => {
                let anchor = locator::anchor_at_point(&self.document, x, y, target);
                let scroll = self.document.scroll_offset();
                let viewport = self.document.viewport_size();
                let page_x = x + scroll.x;
                let page_y = y + scroll.y;

                let new = NewComment {
                    text: draft,
                    x: page_x,
                    y: page_y,
                    nx: (viewport.width > 0.0).then(|| page_x / viewport.width),
                    ny: (viewport.height > 0.0).then(|| page_y / viewport.height),
                    anchor,
                    id: None,
                    timestamp: None,
                };
                if self.add(new).is_some() {
                    self.editor = None;
                }
            }
            EditorMode::Edit { comment_id } => {
                if self.edit(&comment_id, &draft).is_changed() {
                    self.editor = None;
                }
            }
        }
    }

    /// Viewport scrolled or resized: recompute every pin position. Skips
    /// the store entirely.
    pub fn viewport_changed(&mut self) {
        self.reposition();
    }

    /// Pointer moved. Drives the hover state machine, or the active drag.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let pointer = Point::new(x, y);
        if self.drag.is_dragging() {
            let dragged = self.drag.dragged_id().map(str::to_string);
            if let (Some(center), Some(id)) = (self.drag.update(pointer), dragged) {
                self.layer.set_pin_center(&id, center);
            }
            return;
        }
        self.layer.pointer_moved(pointer, &mut self.timers, self.clock_ms);
    }

    /// Pointer pressed. A press on a pin's visible drag handle begins a
    /// drag.
    pub fn pointer_pressed(&mut self, x: f32, y: f32) {
        let pointer = Point::new(x, y);
        let Some(pin) = self.layer.pin_at(pointer) else {
            return;
        };
        if pin.shows_drag_handle() {
            self.drag.begin(pin.comment_id(), pin.center(), pointer);
        }
    }

    /// Pointer released. Commits an active drag through the store.
    pub fn pointer_released(&mut self, x: f32, y: f32) {
        self.drag.update(Point::new(x, y));
        let Some(commit) = self.drag.end(&self.document) else {
            return;
        };

        let Some(store) = self.store.as_mut() else {
            return;
        };
        let change = store.move_to(&commit.comment_id, commit.x, commit.y, commit.nx, commit.ny);
        if change.is_changed() {
            if self.options.debug {
                debug!(id = %commit.comment_id, x = commit.x, y = commit.y, "drag committed");
            }
            self.refresh();
        }
    }

    /// Advance the overlay clock and fire due timers.
    pub fn tick(&mut self, now_ms: u64) {
        self.clock_ms = self.clock_ms.max(now_ms);
        for (_, event) in self.timers.fire_due(now_ms) {
            match &event {
                TimerEvent::FocusEditor => {
                    if let Some(editor) = self.editor.as_mut() {
                        editor.focus();
                    }
                }
                _ => self.layer.handle_timer(&event, &mut self.timers),
            }
        }
    }

    /// Render snapshots for the host; empty while hidden or disabled.
    pub fn views(&self) -> Vec<PinView> {
        self.layer.views()
    }

    /// Rebuild pins from the store and recompute their positions.
    fn refresh(&mut self) {
        let comments = self.get_all();
        self.layer.sync(&comments, &mut self.timers);
        self.reposition();
    }

    fn reposition(&mut self) {
        let dragged = self.drag.dragged_id().map(str::to_string);
        self.layer.reposition(&self.document, dragged.as_deref());
    }
}
