//! Position resolver
//!
//! Converts a comment's logical anchor into current screen coordinates.
//! Anchored comments project into their element's current bounding box;
//! comments without an anchor - or whose anchor no longer resolves - fall
//! back to their absolute page position minus the current scroll offset.
//!
//! The function is pure: for a fixed layout and scroll offset the same
//! comment always yields the same screen position, so callers recompute it
//! on every scroll/resize/mutation instead of caching.

use crate::dom::DomDocument;
use crate::locator;
use pin_model::{Comment, Point};

/// How a screen position was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    /// The anchor path resolved; the position projects into the element's
    /// current bounding box.
    Anchored,
    /// No anchor, or the anchor was stale; the position is the absolute
    /// page point converted to viewport coordinates.
    Absolute,
}

/// A resolved on-screen position for one comment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPosition {
    pub point: Point,
    pub source: PositionSource,
}

/// Compute the current screen position of a comment.
///
/// Exactly one of anchor projection or absolute fallback applies - never
/// both. Anchor resolution failure is silent and local to this comment.
pub fn resolve_screen_position<D: DomDocument>(doc: &D, comment: &Comment) -> ScreenPosition {
    if let Some(anchor) = &comment.anchor {
        if let Some(element) = locator::resolve_path(doc, &anchor.path) {
            if let Some(rect) = doc.bounding_box(element) {
                return ScreenPosition {
                    point: rect.point_at(anchor.rx, anchor.ry),
                    source: PositionSource::Anchored,
                };
            }
        }
    }

    let scroll = doc.scroll_offset();
    ScreenPosition {
        point: Point::new(comment.x - scroll.x, comment.y - scroll.y),
        source: PositionSource::Absolute,
    }
}
