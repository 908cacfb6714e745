//! Pin presentation state
//!
//! One `Pin` per comment, carrying its resolved screen position and a
//! three-phase presentation state machine: `Collapsed` (small circular
//! glyph) grows to `Expanding` when the pointer comes within the proximity
//! radius, and becomes `Expanded` (full text visible) once the growth timer
//! completes. Leaving proximity schedules a collapse after a short delay so
//! a pointer skimming the edge does not flicker the pin.
//!
//! Timers are owned by the overlay's shared queue; the pin only records the
//! ids of its pending entries.

use pagepin_core::position::PositionSource;
use pagepin_scheduler::TimerId;
use pin_model::{Comment, Point, Rect, Size};

/// Pointer distance to the pin center that counts as "near".
pub const PROXIMITY_RADIUS: f32 = 60.0;

/// Delay before a pin outside the proximity radius collapses.
pub const COLLAPSE_DELAY_MS: u64 = 250;

/// Duration of the collapsed-to-expanded growth transition.
pub const EXPAND_DURATION_MS: u64 = 180;

/// Side length of the collapsed glyph.
pub const COLLAPSED_SIZE: f32 = 16.0;

/// Width of the expanded box.
pub const EXPANDED_WIDTH: f32 = 220.0;

/// Minimum height of the expanded box.
pub const EXPANDED_MIN_HEIGHT: f32 = 56.0;

/// Maximum height of the expanded box.
pub const EXPANDED_MAX_HEIGHT: f32 = 240.0;

const PADDING: f32 = 8.0;
const LINE_HEIGHT: f32 = 14.0;
const APPROX_CHAR_WIDTH: f32 = 7.0;

/// Presentation phase of one pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinPhase {
    #[default]
    Collapsed,
    Expanding,
    Expanded,
}

/// Visual state for one comment.
pub struct Pin {
    comment: Comment,
    center: Point,
    source: PositionSource,
    phase: PinPhase,
    hovered: bool,
    collapse_timer: Option<TimerId>,
    expand_timer: Option<TimerId>,
}

impl Pin {
    pub fn new(comment: Comment) -> Self {
        Self {
            comment,
            center: Point::default(),
            source: PositionSource::Absolute,
            phase: PinPhase::Collapsed,
            hovered: false,
            collapse_timer: None,
            expand_timer: None,
        }
    }

    pub fn comment(&self) -> &Comment {
        &self.comment
    }

    pub fn comment_id(&self) -> &str {
        &self.comment.id
    }

    /// Refresh the comment data after a store mutation, keeping the
    /// presentation state.
    pub fn update_comment(&mut self, comment: Comment) {
        self.comment = comment;
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn set_position(&mut self, center: Point, source: PositionSource) {
        self.center = center;
        self.source = source;
    }

    /// Move the pin directly, bypassing anchor resolution. Used while
    /// dragging.
    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    pub fn source(&self) -> PositionSource {
        self.source
    }

    pub fn phase(&self) -> PinPhase {
        self.phase
    }

    /// Current bounding box.
    ///
    /// Collapsed pins are a small square centered on the pin point; an
    /// expanding or expanded pin claims its full grown box (top-left at the
    /// pin point) so hover containment does not jitter mid-transition.
    pub fn bounding_box(&self) -> Rect {
        match self.phase {
            PinPhase::Collapsed => Rect::new(
                self.center.x - COLLAPSED_SIZE / 2.0,
                self.center.y - COLLAPSED_SIZE / 2.0,
                COLLAPSED_SIZE,
                COLLAPSED_SIZE,
            ),
            PinPhase::Expanding | PinPhase::Expanded => {
                let size = self.expanded_size();
                Rect::new(self.center.x, self.center.y, size.width, size.height)
            }
        }
    }

    /// Estimated size of the grown box from the text length.
    pub fn expanded_size(&self) -> Size {
        let content_width = EXPANDED_WIDTH - PADDING * 2.0;
        let chars_per_line = (content_width / APPROX_CHAR_WIDTH).max(1.0) as usize;
        let lines = (self.comment.text.len() / chars_per_line).max(1) as f32 + 1.0;

        let height = (PADDING * 2.0 + lines * LINE_HEIGHT)
            .clamp(EXPANDED_MIN_HEIGHT, EXPANDED_MAX_HEIGHT);
        Size::new(EXPANDED_WIDTH, height)
    }

    /// Proximity test: Euclidean distance from the pointer to the pin
    /// center.
    pub fn is_near(&self, pointer: Point) -> bool {
        pointer.distance_to(&self.center) <= PROXIMITY_RADIUS
    }

    /// Exact containment within the current bounding box. Stricter than
    /// proximity.
    pub fn contains(&self, pointer: Point) -> bool {
        self.bounding_box().contains(pointer)
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Full text is revealed only once the growth transition completes,
    /// never during it.
    pub fn shows_text(&self) -> bool {
        self.phase == PinPhase::Expanded
    }

    /// The metadata line (timestamp) shows only on direct hover.
    pub fn shows_metadata(&self) -> bool {
        self.hovered
    }

    /// The edit/delete action row shows only on direct hover.
    pub fn shows_actions(&self) -> bool {
        self.hovered
    }

    pub fn shows_drag_handle(&self) -> bool {
        self.hovered
    }

    /// Start the growth transition. Stores the id of the scheduled
    /// completion timer.
    pub fn begin_expanding(&mut self, expand_timer: TimerId) {
        self.phase = PinPhase::Expanding;
        self.expand_timer = Some(expand_timer);
    }

    /// Growth timer fired: the box is fully grown.
    pub fn complete_expansion(&mut self) {
        if self.phase == PinPhase::Expanding {
            self.phase = PinPhase::Expanded;
        }
        self.expand_timer = None;
    }

    /// Collapse immediately. Returns the pending growth timer id, if any,
    /// so the caller can cancel it in the shared queue.
    pub fn collapse(&mut self) -> Option<TimerId> {
        self.phase = PinPhase::Collapsed;
        self.hovered = false;
        self.collapse_timer = None;
        self.expand_timer.take()
    }

    pub fn has_collapse_scheduled(&self) -> bool {
        self.collapse_timer.is_some()
    }

    pub fn set_collapse_timer(&mut self, id: TimerId) {
        self.collapse_timer = Some(id);
    }

    /// Clear and return the pending collapse timer id for cancellation.
    pub fn take_collapse_timer(&mut self) -> Option<TimerId> {
        self.collapse_timer.take()
    }

    /// All pending timer ids, for teardown.
    pub fn pending_timers(&self) -> impl Iterator<Item = TimerId> {
        self.collapse_timer.into_iter().chain(self.expand_timer)
    }
}
