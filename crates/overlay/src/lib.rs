//! PagePin Overlay
//!
//! The floating comment-pin layer: per-pin hover state machine, drag
//! controller, creation/edit editor, and the `Overlay` control surface a
//! host drives. Coordinate math and persistence live in `pagepin-core`;
//! this crate owns presentation state and event wiring.
//!
//! # Example
//!
//! ```
//! use pagepin_core::DetachedDocument;
//! use pagepin_overlay::{Overlay, OverlayOptions};
//!
//! let mut overlay = Overlay::new(DetachedDocument);
//! overlay.enable(OverlayOptions::default());
//! assert!(overlay.get_all().is_empty());
//! ```

mod config;
mod drag;
mod editor;
mod layer;
mod manager;
mod pin;

pub use config::{OverlayOptions, Theme};
pub use drag::{DragCommit, DragController};
pub use editor::{EditorAction, EditorKey, EditorMode, EditorState};
pub use layer::{OverlayLayer, PinView, TimerEvent};
pub use manager::Overlay;
pub use pin::{
    Pin, PinPhase, COLLAPSE_DELAY_MS, COLLAPSED_SIZE, EXPANDED_MIN_HEIGHT, EXPANDED_WIDTH,
    EXPAND_DURATION_MS, PROXIMITY_RADIUS,
};
