//! Pin dragging
//!
//! Pointer-down on a pin's drag handle grabs it with an offset; moves track
//! the pointer directly, bypassing the position resolver; pointer-up
//! converts the final screen position back to page and normalized
//! coordinates for a store commit. Anchors are never touched here.

use pagepin_core::DomDocument;
use pin_model::Point;

#[derive(Debug, Clone)]
struct DragState {
    comment_id: String,
    grab_offset: Point,
    pointer: Point,
}

/// Final position of a completed drag, ready for `CommentStore::move_to`.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    pub comment_id: String,
    /// Absolute page coordinates (screen position plus scroll offset).
    pub x: f32,
    pub y: f32,
    /// Page position normalized against the viewport, when the viewport
    /// has a size.
    pub nx: Option<f32>,
    pub ny: Option<f32>,
}

/// Tracks at most one in-flight drag.
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<DragState>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging a pin. The grab offset keeps the pin from jumping to
    /// the pointer.
    pub fn begin(&mut self, comment_id: &str, pin_center: Point, pointer: Point) {
        self.active = Some(DragState {
            comment_id: comment_id.to_string(),
            grab_offset: Point::new(pointer.x - pin_center.x, pointer.y - pin_center.y),
            pointer,
        });
    }

    /// Track a pointer move. Returns the pin's new on-screen center, or
    /// `None` when no drag is active.
    pub fn update(&mut self, pointer: Point) -> Option<Point> {
        let state = self.active.as_mut()?;
        state.pointer = pointer;
        Some(Point::new(
            pointer.x - state.grab_offset.x,
            pointer.y - state.grab_offset.y,
        ))
    }

    /// End the drag and convert the final screen position to page and
    /// normalized coordinates.
    pub fn end<D: DomDocument>(&mut self, doc: &D) -> Option<DragCommit> {
        let state = self.active.take()?;
        let center = Point::new(
            state.pointer.x - state.grab_offset.x,
            state.pointer.y - state.grab_offset.y,
        );

        let scroll = doc.scroll_offset();
        let x = center.x + scroll.x;
        let y = center.y + scroll.y;

        let viewport = doc.viewport_size();
        let nx = (viewport.width > 0.0).then(|| x / viewport.width);
        let ny = (viewport.height > 0.0).then(|| y / viewport.height);

        Some(DragCommit { comment_id: state.comment_id, x, y, nx, ny })
    }

    /// Drop an in-flight drag without committing.
    pub fn abort(&mut self) {
        self.active = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.active.as_ref().map(|state| state.comment_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagepin_core::dom::fake::FakeDocument;

    #[test]
    fn test_update_tracks_pointer_minus_grab_offset() {
        let mut drag = DragController::new();
        // Grab 5px right and 3px below the pin center.
        drag.begin("c1", Point::new(100.0, 100.0), Point::new(105.0, 103.0));

        let center = drag.update(Point::new(205.0, 153.0)).expect("drag active");
        assert_eq!(center, Point::new(200.0, 150.0));
    }

    #[test]
    fn test_end_converts_screen_to_page_and_normalized() {
        let mut doc = FakeDocument::new();
        doc.set_scroll(10.0, 20.0);
        doc.set_viewport(1000.0, 500.0);

        let mut drag = DragController::new();
        drag.begin("c1", Point::new(100.0, 100.0), Point::new(100.0, 100.0));
        drag.update(Point::new(290.0, 80.0));

        let commit = drag.end(&doc).expect("commit expected");
        assert_eq!(commit.comment_id, "c1");
        assert_eq!(commit.x, 300.0);
        assert_eq!(commit.y, 100.0);
        assert_eq!(commit.nx, Some(0.3));
        assert_eq!(commit.ny, Some(0.2));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_zero_viewport_skips_normalized_coordinates() {
        let mut doc = FakeDocument::new();
        doc.set_viewport(0.0, 0.0);

        let mut drag = DragController::new();
        drag.begin("c1", Point::new(50.0, 50.0), Point::new(50.0, 50.0));

        let commit = drag.end(&doc).expect("commit expected");
        assert!(commit.nx.is_none());
        assert!(commit.ny.is_none());
    }

    #[test]
    fn test_end_without_begin_is_none() {
        let doc = FakeDocument::new();
        let mut drag = DragController::new();
        assert!(drag.end(&doc).is_none());
        assert!(drag.update(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_abort_discards_state() {
        let doc = FakeDocument::new();
        let mut drag = DragController::new();
        drag.begin("c1", Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        assert_eq!(drag.dragged_id(), Some("c1"));

        drag.abort();
        assert!(!drag.is_dragging());
        assert!(drag.end(&doc).is_none());
    }
}
