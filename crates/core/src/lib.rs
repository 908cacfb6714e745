//! PagePin Core Library
//!
//! Anchor resolution and viewport reprojection for the comment overlay:
//! the document abstraction, the element locator, the position resolver,
//! the comment store, and export formatting. Everything here is pure over
//! the `DomDocument` trait - no live document is required.

pub mod dom;
pub mod export;
pub mod locator;
pub mod position;
pub mod store;

pub use dom::{DetachedDocument, DomDocument, ElementId};
pub use export::ExportFormat;
pub use position::{PositionSource, ScreenPosition};
pub use store::{CommentStore, NewComment, StoreChange};
