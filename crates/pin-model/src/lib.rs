//! Shared model types for the PagePin overlay
//!
//! Holds the persisted comment record and the small geometry vocabulary
//! (points, sizes, rectangles) used by the storage, core, and overlay crates.
//! Keeping these here avoids a dependency cycle between the storage adapter
//! and the comment store.

use serde::{Deserialize, Serialize};

/// A 2D point in either page or viewport coordinates.
///
/// Page coordinates are independent of the current scroll offset; viewport
/// (screen) coordinates are page coordinates minus the scroll offset. The
/// type itself carries no unit tag - callers track which space they are in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle with top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Check whether a point lies inside the rectangle (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Point at fractional offsets of the box: (0,0) is the top-left corner,
    /// (1,1) the bottom-right.
    pub fn point_at(&self, rx: f32, ry: f32) -> Point {
        Point::new(self.x + rx * self.width, self.y + ry * self.height)
    }

    pub fn center(&self) -> Point {
        self.point_at(0.5, 0.5)
    }
}

/// Element-relative addressing for a pin.
///
/// `path` is a serialized element locator (see `pagepin-core::locator`);
/// `rx`/`ry` are the pin's position as a fraction of that element's bounding
/// box, clamped to [0, 1] at creation and immutable afterwards. Dragging a
/// comment updates its absolute coordinates, never these fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Serialized element locator
    pub path: String,
    /// Horizontal fraction of the element's bounding box width
    pub rx: f32,
    /// Vertical fraction of the element's bounding box height
    pub ry: f32,
}

impl Anchor {
    /// Create an anchor, clamping the fractions into [0, 1].
    pub fn new(path: impl Into<String>, rx: f32, ry: f32) -> Self {
        Self { path: path.into(), rx: rx.clamp(0.0, 1.0), ry: ry.clamp(0.0, 1.0) }
    }
}

/// The persisted comment record.
///
/// This is the exact shape of one entry in the stored JSON snapshot:
/// `{id, text, x, y, timestamp, nx?, ny?, anchor?}`. `x`/`y` are absolute
/// page coordinates used as the fallback position whenever the anchor is
/// absent or no longer resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Opaque unique identifier, immutable after creation
    pub id: String,

    /// User-entered text; never empty after creation
    pub text: String,

    /// Absolute page x coordinate (scroll-independent)
    pub x: f32,

    /// Absolute page y coordinate (scroll-independent)
    pub y: f32,

    /// Creation time in milliseconds since the Unix epoch; edits never
    /// change it
    pub timestamp: i64,

    /// Normalized x position (x / viewport width) captured at creation.
    /// Informational only - never used for reprojection when an anchor is
    /// present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nx: Option<f32>,

    /// Normalized y position (y / viewport height) captured at creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ny: Option<f32>,

    /// Optional element-relative anchor; preferred over `x`/`y` whenever
    /// its path still resolves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
}

impl Comment {
    /// Absolute page position as a point.
    pub fn page_position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
