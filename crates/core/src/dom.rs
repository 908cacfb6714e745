//! Document abstraction
//!
//! The overlay never touches a live DOM directly. Hosts implement
//! `DomDocument` - structure queries for the element locator plus the three
//! geometry reads the position resolver needs (bounding boxes, scroll
//! offset, viewport size) and a hit-test for anchor capture. The trait is
//! deliberately narrow so the coordinate math stays testable without a real
//! page.

use pin_model::{Point, Rect, Size};

/// Opaque handle to one element of the host document.
///
/// Handles are only meaningful to the document that produced them and may
/// be invalidated by DOM mutations; the locator path, not the handle, is
/// what gets persisted.
pub type ElementId = u64;

/// Narrow view of the host page.
///
/// All geometry is in viewport (screen) coordinates. Every method is a
/// query; implementations must not mutate the page.
pub trait DomDocument {
    /// The document body, if a page is attached at all.
    fn body(&self) -> Option<ElementId>;

    fn parent_of(&self, element: ElementId) -> Option<ElementId>;

    /// Child elements in document order.
    fn children_of(&self, element: ElementId) -> Vec<ElementId>;

    /// Lowercase tag name.
    fn tag_name(&self, element: ElementId) -> Option<String>;

    /// The element's id attribute, when present and non-empty.
    fn id_attribute(&self, element: ElementId) -> Option<String>;

    /// Class names in attribute order.
    fn class_names(&self, element: ElementId) -> Vec<String>;

    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    /// Current bounding box in viewport coordinates, or `None` for detached
    /// elements.
    fn bounding_box(&self, element: ElementId) -> Option<Rect>;

    /// Current scroll offset (page coordinates of the viewport origin).
    fn scroll_offset(&self) -> Point;

    fn viewport_size(&self) -> Size;

    /// Topmost page element under a viewport point, excluding the overlay's
    /// own surface. Used for anchor capture when a comment is placed.
    fn element_at_point(&self, x: f32, y: f32) -> Option<ElementId>;
}

/// Document for contexts with no page at all (server-side, data-only use).
///
/// Every query returns empty; the overlay degrades to no-op rendering while
/// data operations (store, export) keep working.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedDocument;

impl DomDocument for DetachedDocument {
    fn body(&self) -> Option<ElementId> {
        None
    }

    fn parent_of(&self, _element: ElementId) -> Option<ElementId> {
        None
    }

    fn children_of(&self, _element: ElementId) -> Vec<ElementId> {
        Vec::new()
    }

    fn tag_name(&self, _element: ElementId) -> Option<String> {
        None
    }

    fn id_attribute(&self, _element: ElementId) -> Option<String> {
        None
    }

    fn class_names(&self, _element: ElementId) -> Vec<String> {
        Vec::new()
    }

    fn element_by_id(&self, _id: &str) -> Option<ElementId> {
        None
    }

    fn bounding_box(&self, _element: ElementId) -> Option<Rect> {
        None
    }

    fn scroll_offset(&self) -> Point {
        Point::default()
    }

    fn viewport_size(&self) -> Size {
        Size::default()
    }

    fn element_at_point(&self, _x: f32, _y: f32) -> Option<ElementId> {
        None
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! In-memory document for tests.

    use super::{DomDocument, ElementId};
    use pin_model::{Point, Rect, Size};

    #[derive(Debug, Clone)]
    struct FakeElement {
        tag: String,
        id_attr: Option<String>,
        classes: Vec<String>,
        parent: Option<ElementId>,
        children: Vec<ElementId>,
        bbox: Option<Rect>,
        depth: u32,
    }

    /// Build-by-hand document tree with settable geometry.
    ///
    /// Element 0 is always the body. Boxes are in viewport coordinates,
    /// exactly as a host would report them.
    #[derive(Debug, Clone)]
    pub struct FakeDocument {
        elements: Vec<FakeElement>,
        scroll: Point,
        viewport: Size,
    }

    impl FakeDocument {
        pub fn new() -> Self {
            let body = FakeElement {
                tag: "body".to_string(),
                id_attr: None,
                classes: Vec::new(),
                parent: None,
                children: Vec::new(),
                bbox: None,
                depth: 0,
            };
            Self {
                elements: vec![body],
                scroll: Point::default(),
                viewport: Size::new(1280.0, 800.0),
            }
        }

        pub fn body_id(&self) -> ElementId {
            0
        }

        /// Append a child element and return its handle.
        pub fn add_element(&mut self, parent: ElementId, tag: &str) -> ElementId {
            let id = self.elements.len() as ElementId;
            let depth = self.elements[parent as usize].depth + 1;
            self.elements.push(FakeElement {
                tag: tag.to_ascii_lowercase(),
                id_attr: None,
                classes: Vec::new(),
                parent: Some(parent),
                children: Vec::new(),
                bbox: None,
                depth,
            });
            self.elements[parent as usize].children.push(id);
            id
        }

        pub fn set_id_attribute(&mut self, element: ElementId, id: &str) {
            self.elements[element as usize].id_attr = Some(id.to_string());
        }

        pub fn set_classes(&mut self, element: ElementId, classes: &[&str]) {
            self.elements[element as usize].classes =
                classes.iter().map(|c| c.to_string()).collect();
        }

        pub fn set_bounding_box(&mut self, element: ElementId, rect: Rect) {
            self.elements[element as usize].bbox = Some(rect);
        }

        pub fn set_scroll(&mut self, x: f32, y: f32) {
            self.scroll = Point::new(x, y);
        }

        pub fn set_viewport(&mut self, width: f32, height: f32) {
            self.viewport = Size::new(width, height);
        }

        /// Detach an element (and its subtree) from the tree, simulating
        /// removal from the page. The handle stays allocated but resolves
        /// to nothing.
        pub fn remove_element(&mut self, element: ElementId) {
            if let Some(parent) = self.elements[element as usize].parent.take() {
                self.elements[parent as usize].children.retain(|&c| c != element);
            }
            self.elements[element as usize].bbox = None;
            for child in self.elements[element as usize].children.clone() {
                self.remove_element(child);
            }
        }
    }

    impl Default for FakeDocument {
        fn default() -> Self {
            Self::new()
        }
    }

    impl DomDocument for FakeDocument {
        fn body(&self) -> Option<ElementId> {
            Some(0)
        }

        fn parent_of(&self, element: ElementId) -> Option<ElementId> {
            self.elements.get(element as usize)?.parent
        }

        fn children_of(&self, element: ElementId) -> Vec<ElementId> {
            self.elements
                .get(element as usize)
                .map(|e| e.children.clone())
                .unwrap_or_default()
        }

        fn tag_name(&self, element: ElementId) -> Option<String> {
            self.elements.get(element as usize).map(|e| e.tag.clone())
        }

        fn id_attribute(&self, element: ElementId) -> Option<String> {
            self.elements
                .get(element as usize)
                .and_then(|e| e.id_attr.clone())
                .filter(|id| !id.is_empty())
        }

        fn class_names(&self, element: ElementId) -> Vec<String> {
            self.elements
                .get(element as usize)
                .map(|e| e.classes.clone())
                .unwrap_or_default()
        }

        fn element_by_id(&self, id: &str) -> Option<ElementId> {
            self.elements
                .iter()
                .position(|e| e.id_attr.as_deref() == Some(id) && (e.parent.is_some() || e.depth == 0))
                .map(|index| index as ElementId)
        }

        fn bounding_box(&self, element: ElementId) -> Option<Rect> {
            self.elements.get(element as usize)?.bbox
        }

        fn scroll_offset(&self) -> Point {
            self.scroll
        }

        fn viewport_size(&self) -> Size {
            self.viewport
        }

        fn element_at_point(&self, x: f32, y: f32) -> Option<ElementId> {
            let point = Point::new(x, y);
            self.elements
                .iter()
                .enumerate()
                .filter(|(_, e)| e.bbox.map(|b| b.contains(point)).unwrap_or(false))
                .max_by_key(|(index, e)| (e.depth, *index))
                .map(|(index, _)| index as ElementId)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeDocument;
    use super::*;
    use pin_model::Rect;

    #[test]
    fn test_detached_document_returns_empty_defaults() {
        let doc = DetachedDocument;
        assert!(doc.body().is_none());
        assert!(doc.element_by_id("anything").is_none());
        assert_eq!(doc.scroll_offset(), Point::default());
        assert_eq!(doc.viewport_size(), Size::default());
    }

    #[test]
    fn test_fake_document_tree_queries() {
        let mut doc = FakeDocument::new();
        let section = doc.add_element(doc.body_id(), "section");
        let para = doc.add_element(section, "p");

        assert_eq!(doc.parent_of(para), Some(section));
        assert_eq!(doc.children_of(section), vec![para]);
        assert_eq!(doc.tag_name(para).as_deref(), Some("p"));
    }

    #[test]
    fn test_fake_document_hit_test_prefers_deepest() {
        let mut doc = FakeDocument::new();
        let outer = doc.add_element(doc.body_id(), "div");
        let inner = doc.add_element(outer, "span");
        doc.set_bounding_box(outer, Rect::new(0.0, 0.0, 200.0, 200.0));
        doc.set_bounding_box(inner, Rect::new(50.0, 50.0, 20.0, 20.0));

        assert_eq!(doc.element_at_point(60.0, 60.0), Some(inner));
        assert_eq!(doc.element_at_point(10.0, 10.0), Some(outer));
        assert_eq!(doc.element_at_point(500.0, 500.0), None);
    }

    #[test]
    fn test_fake_document_removal_detaches_subtree() {
        let mut doc = FakeDocument::new();
        let outer = doc.add_element(doc.body_id(), "div");
        let inner = doc.add_element(outer, "span");
        doc.set_bounding_box(inner, Rect::new(0.0, 0.0, 10.0, 10.0));

        doc.remove_element(outer);
        assert!(doc.parent_of(outer).is_none());
        assert!(doc.bounding_box(inner).is_none());
        assert!(doc.children_of(doc.body_id()).is_empty());
    }
}
