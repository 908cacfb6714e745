//! Element locator
//!
//! Serializes an element to a stable textual path and resolves such a path
//! back to an element. Elements with an id attribute get a direct `#id`
//! reference; everything else gets an ancestor walk from just below the
//! body, one segment per level: `tag(.class){0,2}:nth-of-type(k)` where `k`
//! is the 1-based position among same-tag siblings. Segments are joined
//! root-to-leaf with `" > "`.
//!
//! The positional index makes paths resilient to insertions of
//! different-tag siblings, but not to reordering of same-tag siblings.
//! Resolution never panics: malformed or unmatchable paths are simply
//! not-found.

use crate::dom::{DomDocument, ElementId};
use pin_model::Anchor;

/// Separator between path segments.
const SEGMENT_SEPARATOR: &str = " > ";

/// Maximum number of class names carried per segment.
const MAX_SEGMENT_CLASSES: usize = 2;

/// Serialize an element to a locator path.
///
/// The body itself serializes to the empty string - pins never anchor to
/// the body, and `resolve` treats an empty path as not-found.
pub fn serialize_element<D: DomDocument>(doc: &D, element: ElementId) -> String {
    if doc.body() == Some(element) {
        return String::new();
    }

    if let Some(id) = doc.id_attribute(element) {
        return format!("#{id}");
    }

    let mut segments = Vec::new();
    let mut current = element;
    loop {
        let Some(segment) = build_segment(doc, current) else {
            break;
        };
        segments.push(segment);

        match doc.parent_of(current) {
            Some(parent) if doc.body() != Some(parent) => current = parent,
            _ => break,
        }
    }

    segments.reverse();
    segments.join(SEGMENT_SEPARATOR)
}

/// Resolve a locator path back to an element.
///
/// Empty, malformed, or unmatchable paths return `None`.
pub fn resolve_path<D: DomDocument>(doc: &D, path: &str) -> Option<ElementId> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }

    if let Some(id) = path.strip_prefix('#') {
        if id.is_empty() {
            return None;
        }
        return doc.element_by_id(id);
    }

    let mut current = doc.body()?;
    for raw_segment in path.split('>') {
        let segment = parse_segment(raw_segment.trim())?;
        current = match_child(doc, current, &segment)?;
    }

    Some(current)
}

/// Capture an anchor for a placement point.
///
/// Uses the explicit `target` when given, otherwise hit-tests the document
/// under the point (hosts exclude the overlay's own surface from that
/// query). The body never anchors. Fractions are computed against the
/// element's current bounding box and clamped to [0, 1].
pub fn anchor_at_point<D: DomDocument>(
    doc: &D,
    x: f32,
    y: f32,
    target: Option<ElementId>,
) -> Option<Anchor> {
    let element = match target {
        Some(element) => element,
        None => doc.element_at_point(x, y)?,
    };

    if doc.body() == Some(element) {
        return None;
    }

    let path = serialize_element(doc, element);
    if path.is_empty() {
        return None;
    }

    let rect = doc.bounding_box(element)?;
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }

    Some(Anchor::new(path, (x - rect.x) / rect.width, (y - rect.y) / rect.height))
}

struct Segment {
    tag: String,
    classes: Vec<String>,
    index: usize,
}

fn build_segment<D: DomDocument>(doc: &D, element: ElementId) -> Option<String> {
    let tag = doc.tag_name(element)?;
    let mut segment = tag.clone();

    for class in doc.class_names(element).iter().take(MAX_SEGMENT_CLASSES) {
        segment.push('.');
        segment.push_str(class);
    }

    segment.push_str(&format!(":nth-of-type({})", same_tag_index(doc, element, &tag)));
    Some(segment)
}

/// 1-based position among same-tag siblings under the element's parent.
fn same_tag_index<D: DomDocument>(doc: &D, element: ElementId, tag: &str) -> usize {
    let Some(parent) = doc.parent_of(element) else {
        return 1;
    };

    let mut index = 0;
    for sibling in doc.children_of(parent) {
        if doc.tag_name(sibling).as_deref() == Some(tag) {
            index += 1;
        }
        if sibling == element {
            return index.max(1);
        }
    }

    1
}

fn parse_segment(raw: &str) -> Option<Segment> {
    if raw.is_empty() {
        return None;
    }

    let (selector, index) = match raw.split_once(":nth-of-type(") {
        Some((selector, rest)) => {
            let digits = rest.strip_suffix(')')?;
            (selector, digits.parse::<usize>().ok().filter(|&i| i >= 1)?)
        }
        None => (raw, 1),
    };

    let mut parts = selector.split('.');
    let tag = parts.next()?.trim().to_ascii_lowercase();
    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return None;
    }

    let mut classes = Vec::new();
    for class in parts {
        if class.is_empty() {
            return None;
        }
        classes.push(class.to_string());
    }

    Some(Segment { tag, classes, index })
}

/// Find the `index`-th same-tag child of `parent` and check its classes.
fn match_child<D: DomDocument>(
    doc: &D,
    parent: ElementId,
    segment: &Segment,
) -> Option<ElementId> {
    let mut seen = 0;
    for child in doc.children_of(parent) {
        if doc.tag_name(child).as_deref() != Some(segment.tag.as_str()) {
            continue;
        }
        seen += 1;
        if seen == segment.index {
            let classes = doc.class_names(child);
            if segment.classes.iter().all(|c| classes.contains(c)) {
                return Some(child);
            }
            return None;
        }
    }

    None
}
