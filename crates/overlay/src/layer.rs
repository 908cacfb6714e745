//! Overlay layer
//!
//! Owns the pin list, keeps it in sync with the comment store, repositions
//! pins on viewport events, and drives every pin's hover state machine from
//! pointer movement. Rendering hosts read `views()` and draw.

use crate::pin::{Pin, PinPhase, COLLAPSE_DELAY_MS, EXPAND_DURATION_MS};
use pagepin_core::position::{self, PositionSource};
use pagepin_core::DomDocument;
use pagepin_scheduler::TimerQueue;
use pin_model::{Comment, Point, Rect};

/// Deferred overlay work carried by the shared timer queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Collapse a pin that left the proximity radius.
    Collapse { comment_id: String },
    /// A pin's growth transition finished; reveal its text.
    ExpandComplete { comment_id: String },
    /// Focus the editor input now that its surface is attached.
    FocusEditor,
}

/// Snapshot of one pin for the rendering host.
#[derive(Debug, Clone, PartialEq)]
pub struct PinView {
    pub comment_id: String,
    pub center: Point,
    pub rect: Rect,
    pub phase: PinPhase,
    pub source: PositionSource,
    pub text: Option<String>,
    pub shows_metadata: bool,
    pub shows_actions: bool,
    pub shows_drag_handle: bool,
}

/// The visual layer holding one pin per comment.
#[derive(Default)]
pub struct OverlayLayer {
    pins: Vec<Pin>,
    visible: bool,
}

impl OverlayLayer {
    pub fn new() -> Self {
        Self { pins: Vec::new(), visible: false }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Rebuild the pin list from the store snapshot, preserving each
    /// surviving pin's presentation state by comment id. Pins for removed
    /// comments have their pending timers cancelled.
    pub fn sync(&mut self, comments: &[Comment], timers: &mut TimerQueue<TimerEvent>) {
        let mut old = std::mem::take(&mut self.pins);

        for comment in comments {
            let pin = match old.iter().position(|p| p.comment_id() == comment.id) {
                Some(index) => {
                    let mut pin = old.swap_remove(index);
                    pin.update_comment(comment.clone());
                    pin
                }
                None => Pin::new(comment.clone()),
            };
            self.pins.push(pin);
        }

        for removed in old {
            for id in removed.pending_timers() {
                timers.cancel(id);
            }
        }
    }

    /// Recompute every pin's screen position from its comment. `skip` holds
    /// the id of a pin currently being dragged, which tracks the pointer
    /// instead.
    pub fn reposition<D: DomDocument>(&mut self, doc: &D, skip: Option<&str>) {
        for pin in &mut self.pins {
            if skip == Some(pin.comment_id()) {
                continue;
            }
            let resolved = position::resolve_screen_position(doc, pin.comment());
            pin.set_position(resolved.point, resolved.source);
        }
    }

    /// Drive the hover state machine for every pin.
    ///
    /// Entering the proximity radius cancels a pending collapse and starts
    /// the growth transition; leaving it schedules a collapse after the
    /// grace delay. Exact containment updates direct-hover state.
    pub fn pointer_moved(
        &mut self,
        pointer: Point,
        timers: &mut TimerQueue<TimerEvent>,
        now_ms: u64,
    ) {
        if !self.visible {
            return;
        }

        for pin in &mut self.pins {
            if pin.is_near(pointer) {
                if let Some(id) = pin.take_collapse_timer() {
                    timers.cancel(id);
                }
                if pin.phase() == PinPhase::Collapsed {
                    let handle = timers.schedule(
                        now_ms,
                        EXPAND_DURATION_MS,
                        TimerEvent::ExpandComplete { comment_id: pin.comment_id().to_string() },
                    );
                    pin.begin_expanding(handle.id);
                }
            } else if pin.phase() != PinPhase::Collapsed && !pin.has_collapse_scheduled() {
                let handle = timers.schedule(
                    now_ms,
                    COLLAPSE_DELAY_MS,
                    TimerEvent::Collapse { comment_id: pin.comment_id().to_string() },
                );
                pin.set_collapse_timer(handle.id);
            }

            let contained = pin.contains(pointer);
            pin.set_hovered(contained);
        }
    }

    /// Apply a fired pin timer.
    pub fn handle_timer(&mut self, event: &TimerEvent, timers: &mut TimerQueue<TimerEvent>) {
        match event {
            TimerEvent::Collapse { comment_id } => {
                if let Some(pin) = self.pin_mut(comment_id) {
                    if let Some(expand) = pin.collapse() {
                        timers.cancel(expand);
                    }
                }
            }
            TimerEvent::ExpandComplete { comment_id } => {
                if let Some(pin) = self.pin_mut(comment_id) {
                    pin.complete_expansion();
                }
            }
            TimerEvent::FocusEditor => {}
        }
    }

    /// Topmost pin under a viewport point, later comments first.
    pub fn pin_at(&self, pointer: Point) -> Option<&Pin> {
        if !self.visible {
            return None;
        }
        self.pins.iter().rev().find(|pin| pin.contains(pointer))
    }

    pub fn pin(&self, comment_id: &str) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.comment_id() == comment_id)
    }

    fn pin_mut(&mut self, comment_id: &str) -> Option<&mut Pin> {
        self.pins.iter_mut().find(|pin| pin.comment_id() == comment_id)
    }

    /// Move one pin directly, bypassing anchor resolution. Used by drags.
    pub fn set_pin_center(&mut self, comment_id: &str, center: Point) {
        if let Some(pin) = self.pin_mut(comment_id) {
            pin.set_center(center);
        }
    }

    /// Render snapshots for the host, empty while the layer is hidden.
    pub fn views(&self) -> Vec<PinView> {
        if !self.visible {
            return Vec::new();
        }

        self.pins
            .iter()
            .map(|pin| PinView {
                comment_id: pin.comment_id().to_string(),
                center: pin.center(),
                rect: pin.bounding_box(),
                phase: pin.phase(),
                source: pin.source(),
                text: pin.shows_text().then(|| pin.comment().text.clone()),
                shows_metadata: pin.shows_metadata(),
                shows_actions: pin.shows_actions(),
                shows_drag_handle: pin.shows_drag_handle(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Drop all pins, cancelling their pending timers.
    pub fn clear(&mut self, timers: &mut TimerQueue<TimerEvent>) {
        for pin in self.pins.drain(..) {
            for id in pin.pending_timers() {
                timers.cancel(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagepin_core::dom::fake::FakeDocument;

    fn comment(id: &str, x: f32, y: f32) -> Comment {
        Comment {
            id: id.to_string(),
            text: format!("note {id}"),
            x,
            y,
            timestamp: 0,
            nx: None,
            ny: None,
            anchor: None,
        }
    }

    fn visible_layer() -> (OverlayLayer, TimerQueue<TimerEvent>) {
        let mut layer = OverlayLayer::new();
        layer.set_visible(true);
        (layer, TimerQueue::new())
    }

    #[test]
    fn test_sync_preserves_pin_state_by_id() {
        let (mut layer, mut timers) = visible_layer();
        layer.sync(&[comment("a", 0.0, 0.0)], &mut timers);

        let doc = FakeDocument::new();
        layer.reposition(&doc, None);
        layer.pointer_moved(Point::new(0.0, 0.0), &mut timers, 0);
        assert_eq!(layer.pin("a").unwrap().phase(), PinPhase::Expanding);

        // Re-sync with an extra comment: the existing pin keeps its phase.
        layer.sync(&[comment("a", 0.0, 0.0), comment("b", 500.0, 500.0)], &mut timers);
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.pin("a").unwrap().phase(), PinPhase::Expanding);
        assert_eq!(layer.pin("b").unwrap().phase(), PinPhase::Collapsed);
    }

    #[test]
    fn test_sync_cancels_timers_of_removed_pins() {
        let (mut layer, mut timers) = visible_layer();
        layer.sync(&[comment("a", 0.0, 0.0)], &mut timers);

        let doc = FakeDocument::new();
        layer.reposition(&doc, None);
        layer.pointer_moved(Point::new(0.0, 0.0), &mut timers, 0);
        assert_eq!(timers.len(), 1);

        layer.sync(&[], &mut timers);
        assert!(layer.is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_proximity_expands_and_timer_reveals_text() {
        let (mut layer, mut timers) = visible_layer();
        layer.sync(&[comment("a", 100.0, 100.0)], &mut timers);
        layer.reposition(&FakeDocument::new(), None);

        layer.pointer_moved(Point::new(110.0, 110.0), &mut timers, 0);
        assert_eq!(layer.pin("a").unwrap().phase(), PinPhase::Expanding);
        assert!(layer.views()[0].text.is_none());

        for (_, event) in timers.fire_due(EXPAND_DURATION_MS) {
            layer.handle_timer(&event, &mut timers);
        }
        assert_eq!(layer.pin("a").unwrap().phase(), PinPhase::Expanded);
        assert_eq!(layer.views()[0].text.as_deref(), Some("note a"));
    }

    #[test]
    fn test_leaving_proximity_schedules_collapse() {
        let (mut layer, mut timers) = visible_layer();
        layer.sync(&[comment("a", 100.0, 100.0)], &mut timers);
        layer.reposition(&FakeDocument::new(), None);

        layer.pointer_moved(Point::new(100.0, 100.0), &mut timers, 0);
        for (_, event) in timers.fire_due(EXPAND_DURATION_MS) {
            layer.handle_timer(&event, &mut timers);
        }

        let away = Point::new(600.0, 600.0);
        layer.pointer_moved(away, &mut timers, 200);
        assert!(layer.pin("a").unwrap().has_collapse_scheduled());

        // Still expanded until the delay elapses.
        assert_eq!(layer.pin("a").unwrap().phase(), PinPhase::Expanded);
        for (_, event) in timers.fire_due(200 + COLLAPSE_DELAY_MS) {
            layer.handle_timer(&event, &mut timers);
        }
        assert_eq!(layer.pin("a").unwrap().phase(), PinPhase::Collapsed);
    }

    #[test]
    fn test_reentering_proximity_cancels_collapse() {
        let (mut layer, mut timers) = visible_layer();
        layer.sync(&[comment("a", 100.0, 100.0)], &mut timers);
        layer.reposition(&FakeDocument::new(), None);

        layer.pointer_moved(Point::new(100.0, 100.0), &mut timers, 0);
        for (_, event) in timers.fire_due(EXPAND_DURATION_MS) {
            layer.handle_timer(&event, &mut timers);
        }

        layer.pointer_moved(Point::new(600.0, 600.0), &mut timers, 200);
        layer.pointer_moved(Point::new(105.0, 105.0), &mut timers, 300);
        assert!(!layer.pin("a").unwrap().has_collapse_scheduled());

        // The cancelled collapse never fires.
        for (_, event) in timers.fire_due(10_000) {
            layer.handle_timer(&event, &mut timers);
        }
        assert_eq!(layer.pin("a").unwrap().phase(), PinPhase::Expanded);
    }

    #[test]
    fn test_views_empty_while_hidden() {
        let (mut layer, mut timers) = visible_layer();
        layer.sync(&[comment("a", 0.0, 0.0)], &mut timers);
        assert_eq!(layer.views().len(), 1);

        layer.set_visible(false);
        assert!(layer.views().is_empty());
        assert!(layer.pin_at(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_reposition_skips_dragged_pin() {
        let (mut layer, mut timers) = visible_layer();
        layer.sync(&[comment("a", 100.0, 100.0), comment("b", 300.0, 300.0)], &mut timers);

        layer.set_pin_center("a", Point::new(42.0, 42.0));
        layer.reposition(&FakeDocument::new(), Some("a"));

        assert_eq!(layer.pin("a").unwrap().center(), Point::new(42.0, 42.0));
        assert_eq!(layer.pin("b").unwrap().center(), Point::new(300.0, 300.0));
    }

    #[test]
    fn test_pin_at_prefers_later_comments() {
        let (mut layer, mut timers) = visible_layer();
        layer.sync(&[comment("under", 100.0, 100.0), comment("over", 104.0, 104.0)], &mut timers);
        layer.reposition(&FakeDocument::new(), None);

        let hit = layer.pin_at(Point::new(102.0, 102.0)).expect("pin expected");
        assert_eq!(hit.comment_id(), "over");
    }
}
